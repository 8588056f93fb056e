//! Server-rendered pages.
//!
//! Templates are compiled in and rendered with minijinja; `.html` names turn on
//! auto-escaping, so secret text is always escaped.
use std::fmt;

use minijinja::{Environment, context};

use crate::services::secret::FORM_DURATIONS_HOURS;

pub const INVALID_LINK_MESSAGE: &str = "Ссылка не валидна или срок действия ссылки истек";

const BASE: &str = r#"<!doctype html>
<html lang="ru">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="robots" content="noindex, nofollow">
  <title>{% block title %}Одноразовая ссылка{% endblock %}</title>
  <style>
    body { font-family: sans-serif; max-width: 40rem; margin: 3rem auto; padding: 0 1rem; }
    textarea { width: 100%; min-height: 10rem; }
    pre { white-space: pre-wrap; word-break: break-word; background: #f4f4f4; padding: 1rem; }
  </style>
</head>
<body>
{% block body %}{% endblock %}
</body>
</html>
"#;

const INDEX: &str = r#"{% extends "base.html" %}
{% block body %}
<h1>Одноразовая ссылка</h1>
<form method="post" action="/create">
  <textarea name="text" required></textarea>
  <label>Срок жизни ссылки
    <select name="duration">
      {% for hours in durations %}<option value="{{ hours }}">{{ hours }} ч</option>{% endfor %}
    </select>
  </label>
  <button type="submit">Создать</button>
</form>
{% endblock %}
"#;

const PRINT_URL: &str = r#"{% extends "base.html" %}
{% block body %}
{% if link %}<p>Ссылка для получения текста:</p>
<p><a href="{{ text }}">{{ text }}</a></p>{% else %}<p>{{ text }}</p>{% endif %}
<p><a href="/">На главную</a></p>
{% endblock %}
"#;

const PRE_GET: &str = r#"{% extends "base.html" %}
{% block body %}
<p>Текст можно открыть только один раз. После просмотра ссылка перестанет работать.</p>
<p><a href="{{ get_url }}">Показать текст</a></p>
{% endblock %}
"#;

const TEXT: &str = r#"{% extends "base.html" %}
{% block body %}
<pre>{{ text }}</pre>
<p>Ссылка больше не действительна.</p>
{% endblock %}
"#;

pub struct Pages {
    env: Environment<'static>,
}

impl fmt::Debug for Pages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pages").finish_non_exhaustive()
    }
}

impl Pages {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("base.html", BASE)?;
        env.add_template("index.html", INDEX)?;
        env.add_template("print_url.html", PRINT_URL)?;
        env.add_template("pre_get.html", PRE_GET)?;
        env.add_template("text.html", TEXT)?;

        Ok(Self { env })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }

    pub fn index(&self) -> Result<String, minijinja::Error> {
        self.render("index.html", context! { durations => FORM_DURATIONS_HOURS })
    }

    pub fn share_link(&self, url: &str) -> Result<String, minijinja::Error> {
        self.render("print_url.html", context! { text => url, link => true })
    }

    pub fn invalid_link(&self) -> Result<String, minijinja::Error> {
        self.render(
            "print_url.html",
            context! { text => INVALID_LINK_MESSAGE, link => false },
        )
    }

    pub fn confirm(&self, get_url: &str) -> Result<String, minijinja::Error> {
        self.render("pre_get.html", context! { get_url => get_url })
    }

    pub fn text(&self, text: &str) -> Result<String, minijinja::Error> {
        self.render("text.html", context! { text => text })
    }
}

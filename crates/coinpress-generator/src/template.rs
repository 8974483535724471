//! HTML template system for the portal and navigation fragments.
//!
//! Templates use `{{ name }}` interpolation; `{{ name? }}` renders empty when
//! the variable is absent. Values are inserted verbatim, so callers escape
//! user text with [`escape_html`] before putting it in a context.

use std::collections::HashMap;

use thiserror::Error;

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// Template not found.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Invalid template syntax.
    #[error("invalid template syntax: {0}")]
    InvalidSyntax(String),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Template context with variables for interpolation.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable into the context.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Create context with initial variables.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a variable value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }
}

/// A named template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    /// Create a new template with the given name and content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Get the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template with the given context.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut result = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| TemplateError::InvalidSyntax("unclosed {{ delimiter".to_string()))?;

            let var_name = after[..end].trim();
            let (var_name, optional) = match var_name.strip_suffix('?') {
                Some(stripped) => (stripped.trim_end(), true),
                None => (var_name, false),
            };

            match context.get(var_name) {
                Some(v) => result.push_str(v),
                None if optional => {}
                None => return Err(TemplateError::MissingVariable(var_name.to_string())),
            }

            rest = &after[end + 2..];
        }

        result.push_str(rest);
        Ok(result)
    }
}

/// Registry of templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Create a new registry with the built-in templates.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        self.register(Template::new("portal", DEFAULT_PORTAL_TEMPLATE));
        self.register(Template::new("portal_card", DEFAULT_PORTAL_CARD_TEMPLATE));
        self.register(Template::new("portal_empty", DEFAULT_PORTAL_EMPTY_TEMPLATE));
        self.register(Template::new("nav", DEFAULT_NAV_TEMPLATE));
    }

    /// Register a template, replacing any template with the same name.
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.name().to_string(), template);
    }

    /// Get a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Render a named template with the given context.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String> {
        let template = self
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        template.render(context)
    }
}

/// Escape text for use in HTML content and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Portal landing page.
pub const DEFAULT_PORTAL_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="{{ generator }}">
    <title>{{ title }}</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css">
    <style>
        body { background-color: #080808; color: #e5e7eb; }
        .glass-card {
            background: rgba(255, 255, 255, 0.03);
            backdrop-filter: blur(10px);
            border: 1px solid rgba(255, 255, 255, 0.05);
            transition: all 0.3s ease;
        }
        .glass-card:hover {
            background: rgba(255, 255, 255, 0.06);
            border-color: rgba(255, 153, 0, 0.3);
            transform: translateY(-5px);
        }
        .orange-glow { box-shadow: 0 0 20px rgba(255, 153, 0, 0.1); }
    </style>
</head>
<body class="min-h-screen py-12 px-4 sm:px-6 lg:px-8">
    <div class="max-w-5xl mx-auto">
        <header class="text-center mb-16">
            <div class="inline-block p-3 rounded-2xl bg-orange-500/10 mb-4">
                <i class="fa-solid fa-chart-line text-orange-500 text-3xl"></i>
            </div>
            <h1 class="text-4xl font-black tracking-tight mb-2">{{ title }}</h1>
            <p class="text-gray-500">{{ tagline }}</p>
        </header>

        <section class="mb-16" id="latest">
            <h2 class="text-sm font-bold text-orange-500 uppercase tracking-widest mb-6 flex items-center gap-2">
                <span class="w-8 h-[1px] bg-orange-500/30"></span>
                最新发布
            </h2>
            <a href="{{ latest_url }}" class="block group">
                <div class="glass-card orange-glow p-8 rounded-3xl">
                    <div class="flex items-center gap-3 mb-4">
                        <span class="px-3 py-1 bg-orange-500/20 text-orange-500 text-xs font-bold rounded-full">LATEST UPDATE</span>
                        <time class="text-gray-500 text-sm font-mono" datetime="{{ latest_date }}">{{ latest_date }}</time>
                    </div>
                    <h3 class="text-3xl font-bold mb-4 group-hover:text-orange-500 transition-colors">加密货币市场日报 - {{ latest_date }}</h3>
                    <ul class="latest-summaries text-gray-400 leading-relaxed mb-6 space-y-2">
{{ latest_summaries }}
                    </ul>
                    <div class="flex items-center text-orange-500 font-bold gap-2">
                        立即阅读 <i class="fa-solid fa-arrow-right transition-transform group-hover:translate-x-2"></i>
                    </div>
                </div>
            </a>
        </section>

        <section id="archive">
            <h2 class="text-sm font-bold text-gray-500 uppercase tracking-widest mb-6 flex items-center gap-2">
                <span class="w-8 h-[1px] bg-gray-500/30"></span>
                历史存档
            </h2>
            <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-6">
{{ archive_items }}
            </div>
        </section>

        <footer class="mt-24 pt-8 border-t border-white/5 text-center text-gray-600 text-sm">
            <p>&copy; {{ year }} {{ copyright }}. All rights reserved.</p>
        </footer>
    </div>
</body>
</html>
"##;

/// One past entry in the portal archive grid.
pub const DEFAULT_PORTAL_CARD_TEMPLATE: &str = r#"                <a href="{{ url }}" class="glass-card archive-card p-6 rounded-2xl group">
                    <div class="flex justify-between items-start mb-4">
                        <time class="text-gray-500 font-mono text-sm" datetime="{{ date }}">{{ date }}</time>
                        <i class="fa-solid fa-calendar-day text-gray-700 group-hover:text-orange-500/50 transition-colors"></i>
                    </div>
                    <h4 class="font-bold mb-2 group-hover:text-orange-500 transition-colors">市场日报</h4>
                    <p class="text-xs text-gray-500 mb-4">{{ summary }}</p>
                    <div class="text-xs text-gray-500 flex items-center gap-1">
                        查看详情 <i class="fa-solid fa-chevron-right text-[10px]"></i>
                    </div>
                </a>
"#;

/// Archive grid placeholder when only the latest entry exists.
pub const DEFAULT_PORTAL_EMPTY_TEMPLATE: &str =
    r#"                <p class="text-gray-600 col-span-full italic">暂无更多历史记录</p>
"#;

/// Navigation sidebar placed between the nav markers of each entry page.
pub const DEFAULT_NAV_TEMPLATE: &str = r#"<nav class="coinpress-nav" aria-label="日报导航">
    <a class="nav-home" href="{{ home_url }}">返回首页</a>
    <h2 class="nav-heading">最近更新</h2>
    <ul class="nav-recent">
{{ recent_items }}
    </ul>
{{ archive? }}
</nav>"#;

use super::service::EmailMessage;
use crate::batch::NotificationBatch;
use crate::recipes::Recipe;

pub struct TemplateEngine {
    base_url: String,
    from_name: String,
}

impl TemplateEngine {
    pub fn new(base_url: String, from_name: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            from_name,
        }
    }

    /// Render one consolidated reminder for a user's batch
    ///
    /// Every entry is phrased from its own offset, so "expires today" and
    /// "expires in N days" lines can sit side by side.
    pub fn render_reminder(&self, batch: &NotificationBatch, recipes: &[Recipe]) -> EmailMessage {
        let subject = if batch.has_expiring_today() {
            format!("{}: items expiring today", self.from_name)
        } else {
            format!("{}: items expiring soon", self.from_name)
        };

        let pantry_url = format!("{}/inventory", self.base_url);

        let mut text_body = String::from("Hi there,\n\nThese items in your pantry need attention:\n\n");
        for entry in &batch.entries {
            text_body.push_str(&format!(
                "- {} ({}) {}\n",
                entry.name,
                entry.category,
                entry.phrase()
            ));
        }

        if !recipes.is_empty() {
            text_body.push_str("\nRecipe ideas to use them up:\n\n");
            for recipe in recipes {
                text_body.push_str(&format!("- {}\n", recipe.title));
            }
        }

        text_body.push_str(&format!(
            "\nOpen your pantry: {}\n\nThis is an automated message from {}.\n",
            pantry_url, self.from_name
        ));

        let rows: String = batch
            .entries
            .iter()
            .map(|entry| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>",
                    escape_html(&entry.name),
                    escape_html(&entry.category),
                    if entry.day_offset == 0 { "today" } else { "soon" },
                    entry.phrase()
                )
            })
            .collect();

        let recipe_section = if recipes.is_empty() {
            String::new()
        } else {
            let items: String = recipes
                .iter()
                .map(|r| {
                    format!(
                        "<li><strong>{}</strong><br><span>{}</span></li>",
                        escape_html(&r.title),
                        escape_html(&r.short_description)
                    )
                })
                .collect();
            format!("<h3>Recipe ideas</h3><ul>{}</ul>", items)
        };

        let html_body = format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{subject}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif;
            color: #333;
            max-width: 600px;
            margin: 0 auto;
            padding: 20px;
        }}
        table {{ width: 100%; border-collapse: collapse; }}
        td {{ padding: 8px; border-bottom: 1px solid #e0e0e0; }}
        td.today {{ color: #c0392b; font-weight: 600; }}
        td.soon {{ color: #d35400; }}
        .footer {{ color: #7f8c8d; font-size: 14px; margin-top: 20px; }}
    </style>
</head>
<body>
    <h2>These items in your pantry need attention</h2>
    <table>{rows}</table>
    {recipe_section}
    <p><a href="{pantry_url}">Open your pantry</a></p>
    <div class="footer">
        <p>This is an automated message from {from_name}, please do not reply.</p>
    </div>
</body>
</html>"#,
            subject = escape_html(&subject),
            rows = rows,
            recipe_section = recipe_section,
            pantry_url = escape_html(&pantry_url),
            from_name = escape_html(&self.from_name),
        );

        EmailMessage {
            subject,
            html_body,
            text_body,
        }
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

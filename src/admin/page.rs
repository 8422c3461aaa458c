use std::fmt::Write;

use crate::campaign_monitor::{ListSummary, TemplateSummary};
use crate::settings::SettingsRecord;

pub const LOOKUP_ERROR_NOTICE: &str =
    "An error happened on the WordPress side. Make sure your API Key and Client ID are correct.";

/// Everything the settings page shows
#[derive(Debug, Clone, PartialEq)]
pub struct AdminPage {
    pub settings: SettingsRecord,
    pub templates: Vec<TemplateSummary>,
    pub lists: Vec<ListSummary>,
    /// Anti-forgery token embedded in the form
    pub security: String,
}

impl AdminPage {
    pub fn render_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<div class=\"wrap\">\n<h3>Email Notifications Configuration</h3>\n<hr>\n");
        html.push_str(
            "<form id=\"cmnotifier-admin-form\" method=\"post\" action=\"/admin/settings\">\n",
        );
        let _ = writeln!(
            html,
            "<input type=\"hidden\" name=\"security\" value=\"{}\"/>",
            escape(&self.security)
        );
        html.push_str("<table class=\"form-table\">\n");

        self.text_row(&mut html, "api_key", "API Key", "text", 60);
        self.text_row(&mut html, "client_id", "Client ID", "text", 60);

        if self.templates.is_empty() {
            notice_row(&mut html);
        } else {
            let options: Vec<(&str, &str)> = self
                .templates
                .iter()
                .map(|t| (t.template_id.as_str(), t.name.as_str()))
                .collect();
            self.select_row(&mut html, "chosen_template", "Choose a Template", &options);
        }

        if self.lists.is_empty() {
            notice_row(&mut html);
        } else {
            let options: Vec<(&str, &str)> = self
                .lists
                .iter()
                .map(|l| (l.list_id.as_str(), l.name.as_str()))
                .collect();
            self.select_row(&mut html, "chosen_list", "Choose a List", &options);
        }

        self.text_row(&mut html, "from", "From Name", "text", 40);
        self.text_row(&mut html, "from_email", "From Email", "email", 40);
        self.text_row(&mut html, "replyto_email", "ReplyTo Email", "email", 40);
        self.text_row(&mut html, "confirmation_email", "Confirmation Email", "email", 40);

        html.push_str(
            "<tr><th><button class=\"button-primary\" type=\"submit\">Save</button></th></tr>\n",
        );
        html.push_str("</table>\n</form>\n</div>\n");
        html
    }

    fn text_row(&self, html: &mut String, field: &str, label: &str, input_type: &str, size: u32) {
        let value = self.settings.get(field).unwrap_or_default();
        let _ = writeln!(
            html,
            "<tr><th><label for=\"cm_{field}\">{label}</label></th><td>\
             <input name=\"cm_{field}\" id=\"cm_{field}\" type=\"{input_type}\" size=\"{size}\" value=\"{}\"/>\
             </td></tr>",
            escape(value)
        );
    }

    fn select_row(&self, html: &mut String, field: &str, label: &str, options: &[(&str, &str)]) {
        let chosen = self.settings.get(field);
        let _ = write!(
            html,
            "<tr><th><label for=\"cm_{field}\">{label}</label></th><td>\
             <select name=\"cm_{field}\" id=\"cm_{field}\">"
        );
        for (id, name) in options {
            let selected = if chosen == Some(*id) { " selected" } else { "" };
            let _ = write!(
                html,
                "<option value=\"{}\"{selected}>{}</option>",
                escape(id),
                escape(name)
            );
        }
        html.push_str("</select></td></tr>\n");
    }
}

fn notice_row(html: &mut String) {
    let _ = writeln!(
        html,
        "<tr><td><p class=\"notice notice-error\">{LOOKUP_ERROR_NOTICE}</p></td></tr>"
    );
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
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

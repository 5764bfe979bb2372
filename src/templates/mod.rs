mod builders;

use std::collections::HashMap;

use anyhow::{Error, Result, anyhow};
use chrono::{Datelike, Utc};
use tracing::{debug, warn};

use crate::models::{context::NotificationContext, template::RenderedTemplate};

/// Business events that trigger a notification. One builder per variant;
/// there is no runtime registry to miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Welcome,
    StepCompletion,
    Reminder { days_since_last_activity: u32 },
    Completion,
    AdminNewClient,
    AdminClientCompleted,
    AdminClientStuck,
    Custom { subject: String, message: String },
}

// Branded shell shared by every intent: header with tenant logo, content
// slot, footer with support contact and copyright year. The content slot is
// spliced in before variable substitution so builder markup is not escaped.
const BASE_LAYOUT: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
  </head>
  <body style="margin:0;background-color:#f4f4f7;font-family:Helvetica,Arial,sans-serif;">
    <table role="presentation" width="100%" cellpadding="0" cellspacing="0">
      <tr>
        <td align="center" style="padding:24px;">
          <table role="presentation" width="600" cellpadding="0" cellspacing="0" style="background-color:#ffffff;border-radius:8px;overflow:hidden;">
            <tr>
              <td style="background-color:{{brand_color}};padding:24px;text-align:center;">
                <img src="{{logo_url}}" alt="{{brand_name}}" height="40" style="max-height:40px;">
              </td>
            </tr>
            <tr>
              <td style="padding:32px;color:#333333;font-size:15px;line-height:1.6;">
{{content}}
              </td>
            </tr>
            <tr>
              <td style="padding:24px;text-align:center;color:#999999;font-size:12px;">
                Questions? Contact <a href="mailto:{{support_email}}" style="color:#999999;">{{support_email}}</a><br>
                &copy; {{current_year}} {{brand_name}}
              </td>
            </tr>
          </table>
        </td>
      </tr>
    </table>
  </body>
</html>"#;

/// Stateless `(intent, context) -> template` resolver. Identical inputs
/// render byte-identical output within a calendar year (the footer embeds the
/// current year).
pub struct TemplateResolver {
    app_base_url: String,
}

impl TemplateResolver {
    pub fn new(app_base_url: impl Into<String>) -> Self {
        let app_base_url = app_base_url.into().trim_end_matches('/').to_string();

        Self { app_base_url }
    }

    pub fn resolve(
        &self,
        intent: &Intent,
        ctx: &NotificationContext,
    ) -> Result<RenderedTemplate, Error> {
        let mut variables = self.derive_variables(ctx);

        let parts = match intent {
            Intent::Welcome => builders::welcome(),
            Intent::StepCompletion => builders::step_completion(ctx, &mut variables)?,
            Intent::Reminder {
                days_since_last_activity,
            } => builders::reminder(*days_since_last_activity, ctx, &mut variables),
            Intent::Completion => builders::completion(ctx, &mut variables),
            Intent::AdminNewClient => builders::admin_new_client(ctx, &mut variables),
            Intent::AdminClientCompleted => builders::admin_client_completed(ctx, &mut variables),
            Intent::AdminClientStuck => builders::admin_client_stuck(ctx, &mut variables),
            Intent::Custom { subject, message } => {
                builders::custom(subject, message, &mut variables)
            }
        };

        let subject = substitute(&parts.subject, &variables, false)?;
        let html = substitute(
            &BASE_LAYOUT.replace("{{content}}", &parts.html_body),
            &variables,
            true,
        )?;
        let text = substitute(&parts.text, &variables, false)?;

        debug!(
            variable_count = variables.len(),
            "Notification template rendered"
        );

        Ok(RenderedTemplate {
            subject,
            html,
            text,
            variables,
        })
    }

    // Flattens the context into the placeholder set every builder can rely
    // on. Builder-specific values (step titles, reminder wording) are added
    // by the builders themselves.
    fn derive_variables(&self, ctx: &NotificationContext) -> HashMap<String, String> {
        let process_url = format!(
            "{}/process/{}?recipient={}",
            self.app_base_url, ctx.process_instance.id, ctx.recipient.id
        );

        let mut variables = HashMap::new();
        variables.insert("brand_name".to_string(), ctx.tenant.brand_name.clone());
        variables.insert("brand_color".to_string(), ctx.tenant.brand_color.clone());
        variables.insert("logo_url".to_string(), ctx.tenant.logo_url.clone());
        variables.insert(
            "support_email".to_string(),
            ctx.tenant.support_email.clone(),
        );
        variables.insert("client_name".to_string(), ctx.recipient.name.clone());
        variables.insert(
            "process_name".to_string(),
            ctx.process_instance.name.clone(),
        );
        variables.insert("process_url".to_string(), process_url);
        variables.insert(
            "completed_steps".to_string(),
            ctx.completed_steps.to_string(),
        );
        variables.insert("total_steps".to_string(), ctx.total_steps.to_string());
        variables.insert(
            "completion_percentage".to_string(),
            ctx.completion_percentage.to_string(),
        );
        variables.insert("current_year".to_string(), Utc::now().year().to_string());

        variables
    }
}

/// Literal `{{name}}` replacement. Values are HTML-escaped when the output is
/// HTML; subjects and plain-text bodies receive raw values.
fn substitute(
    template: &str,
    variables: &HashMap<String, String>,
    escape: bool,
) -> Result<String, Error> {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{{{}}}}}", key);

        let replacement = if escape {
            escape_html(value)
        } else {
            value.clone()
        };

        result = result.replace(&placeholder, &replacement);
    }

    // Operator and tenant text may contain stray braces; only a `{{` with a
    // closing `}}` after it counts as an unreplaced token.
    if let Some(start) = result.find("{{") {
        if let Some(close) = result[start..].find("}}") {
            let end = start + close + 2;
            let missing_var = &result[start..end];

            warn!(
                missing_variable = %missing_var,
                "Template contains unreplaced variable"
            );

            return Err(anyhow!("Missing variable in template: {}", missing_var));
        }
    }

    Ok(result)
}

pub(crate) fn escape_html(value: &str) -> String {
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

//! Per-intent copy. Each builder supplies the subject, the body markup for
//! the shared shell's content slot, and an independently authored plain-text
//! fallback. The HTML and text variants are kept in sync by hand; there is no
//! tag-stripping derivation.

use std::collections::HashMap;

use anyhow::{Error, Result, anyhow};

use crate::{models::context::NotificationContext, templates::escape_html};

pub(crate) struct TemplateParts {
    pub subject: String,
    pub html_body: String,
    pub text: String,
}

const BUTTON_STYLE: &str = "display:inline-block;background-color:{{brand_color}};color:#ffffff;padding:12px 24px;border-radius:6px;text-decoration:none;font-weight:bold;";

pub(crate) fn welcome() -> TemplateParts {
    let button = format!(
        r#"<p style="text-align:center;"><a href="{{{{process_url}}}}" style="{BUTTON_STYLE}">Get started</a></p>"#
    );

    TemplateParts {
        subject: "Welcome to {{process_name}}".to_string(),
        html_body: [
            r#"<h1 style="font-size:20px;margin-top:0;">Welcome, {{client_name}}!</h1>"#,
            r#"<p>{{brand_name}} has set up <strong>{{process_name}}</strong> to get you up and running. There are {{total_steps}} steps, and you can work through them at your own pace.</p>"#,
            button.as_str(),
            r#"<p>Your progress is saved automatically, so feel free to come back any time.</p>"#,
        ]
        .join("\n"),
        text: [
            "Welcome, {{client_name}}!",
            "",
            "{{brand_name}} has set up {{process_name}} to get you up and running. There are {{total_steps}} steps, and you can work through them at your own pace.",
            "",
            "Get started: {{process_url}}",
            "",
            "Your progress is saved automatically, so feel free to come back any time.",
        ]
        .join("\n"),
    }
}

pub(crate) fn step_completion(
    ctx: &NotificationContext,
    variables: &mut HashMap<String, String>,
) -> Result<TemplateParts, Error> {
    let step = ctx
        .current_step
        .as_ref()
        .ok_or_else(|| anyhow!("Step completion template requires a current step"))?;

    let remaining = ctx.total_steps.saturating_sub(ctx.completed_steps);

    variables.insert("step_title".to_string(), step.title.clone());
    variables.insert("remaining_steps".to_string(), remaining.to_string());

    let button = format!(
        r#"<p style="text-align:center;"><a href="{{{{process_url}}}}" style="{BUTTON_STYLE}">Keep going</a></p>"#
    );

    Ok(TemplateParts {
        subject: "You completed \"{{step_title}}\"".to_string(),
        html_body: [
            r#"<h1 style="font-size:20px;margin-top:0;">Nice work, {{client_name}}!</h1>"#,
            r#"<p>You just completed <strong>{{step_title}}</strong> in {{process_name}}.</p>"#,
            r#"<p>That's {{completed_steps}} of {{total_steps}} steps done ({{completion_percentage}}% complete). Just {{remaining_steps}} more to go.</p>"#,
            button.as_str(),
        ]
        .join("\n"),
        text: [
            "Nice work, {{client_name}}!",
            "",
            "You just completed \"{{step_title}}\" in {{process_name}}.",
            "",
            "That's {{completed_steps}} of {{total_steps}} steps done ({{completion_percentage}}% complete). Just {{remaining_steps}} more to go.",
            "",
            "Keep going: {{process_url}}",
        ]
        .join("\n"),
    })
}

pub(crate) fn reminder(
    days_since_last_activity: u32,
    ctx: &NotificationContext,
    variables: &mut HashMap<String, String>,
) -> TemplateParts {
    let activity_line = if days_since_last_activity <= 1 {
        "You were last active yesterday.".to_string()
    } else {
        format!(
            "It's been {} days since your last activity.",
            days_since_last_activity
        )
    };

    let remaining = ctx.total_steps.saturating_sub(ctx.completed_steps);

    variables.insert("activity_line".to_string(), activity_line);
    variables.insert("remaining_steps".to_string(), remaining.to_string());

    reminder_parts()
}

fn reminder_parts() -> TemplateParts {
    let button = format!(
        r#"<p style="text-align:center;"><a href="{{{{process_url}}}}" style="{BUTTON_STYLE}">Pick up where you left off</a></p>"#
    );

    TemplateParts {
        subject: "Don't lose momentum on {{process_name}}".to_string(),
        html_body: [
            r#"<h1 style="font-size:20px;margin-top:0;">Hi {{client_name}},</h1>"#,
            r#"<p>{{activity_line}}</p>"#,
            r#"<p>You're {{completion_percentage}}% of the way through {{process_name}}, with {{remaining_steps}} steps remaining.</p>"#,
            button.as_str(),
        ]
        .join("\n"),
        text: [
            "Hi {{client_name}},",
            "",
            "{{activity_line}}",
            "",
            "You're {{completion_percentage}}% of the way through {{process_name}}, with {{remaining_steps}} steps remaining.",
            "",
            "Pick up where you left off: {{process_url}}",
        ]
        .join("\n"),
    }
}

pub(crate) fn completion(
    ctx: &NotificationContext,
    variables: &mut HashMap<String, String>,
) -> TemplateParts {
    let mut html_body = [
        r#"<h1 style="font-size:20px;margin-top:0;">Congratulations, {{client_name}}!</h1>"#,
        r#"<p>You've completed all {{total_steps}} steps of <strong>{{process_name}}</strong>. Everything {{brand_name}} needs from you is now in place.</p>"#,
    ]
    .join("\n");

    let mut text = [
        "Congratulations, {{client_name}}!",
        "",
        "You've completed all {{total_steps}} steps of {{process_name}}. Everything {{brand_name}} needs from you is now in place.",
    ]
    .join("\n");

    // Call-to-action only when the tenant configured a post-completion
    // destination.
    if let Some(redirect_url) = &ctx.process_instance.redirect_url {
        variables.insert("redirect_url".to_string(), redirect_url.clone());

        html_body.push('\n');
        html_body.push_str(&format!(
            r#"<p style="text-align:center;"><a href="{{{{redirect_url}}}}" style="{BUTTON_STYLE}">Continue to your next step</a></p>"#
        ));

        text.push_str("\n\nContinue to your next step: {{redirect_url}}");
    }

    html_body.push('\n');
    html_body.push_str(r#"<p>We'll be in touch if anything else comes up. Welcome aboard!</p>"#);

    text.push_str("\n\nWe'll be in touch if anything else comes up. Welcome aboard!");

    TemplateParts {
        subject: "You've completed {{process_name}}!".to_string(),
        html_body,
        text,
    }
}

pub(crate) fn admin_new_client(
    ctx: &NotificationContext,
    variables: &mut HashMap<String, String>,
) -> TemplateParts {
    variables.insert("client_email".to_string(), ctx.recipient.email.clone());

    TemplateParts {
        subject: "New client: {{client_name}} started {{process_name}}".to_string(),
        html_body: [
            r#"<h1 style="font-size:20px;margin-top:0;">New client activity</h1>"#,
            r#"<p><strong>{{client_name}}</strong> ({{client_email}}) just started {{process_name}}.</p>"#,
            r#"<p>They have {{total_steps}} steps ahead of them. You'll be notified as they make progress.</p>"#,
        ]
        .join("\n"),
        text: [
            "New client activity",
            "",
            "{{client_name}} ({{client_email}}) just started {{process_name}}.",
            "",
            "They have {{total_steps}} steps ahead of them. You'll be notified as they make progress.",
        ]
        .join("\n"),
    }
}

// The completed/stuck admin alerts reuse the client-facing builders with a
// recipient-name subject prefix rather than dedicated admin copy.

pub(crate) fn admin_client_completed(
    ctx: &NotificationContext,
    variables: &mut HashMap<String, String>,
) -> TemplateParts {
    let mut parts = completion(ctx, variables);
    parts.subject = format!("{{{{client_name}}}}: {}", parts.subject);
    parts
}

pub(crate) fn admin_client_stuck(
    ctx: &NotificationContext,
    variables: &mut HashMap<String, String>,
) -> TemplateParts {
    // The admin path carries no day counter, so the activity line stays
    // generic.
    let remaining = ctx.total_steps.saturating_sub(ctx.completed_steps);

    variables.insert(
        "activity_line".to_string(),
        "It's been a few days since the last activity here.".to_string(),
    );
    variables.insert("remaining_steps".to_string(), remaining.to_string());

    let mut parts = reminder_parts();
    parts.subject = format!("{{{{client_name}}}}: {}", parts.subject);
    parts
}

pub(crate) fn custom(
    subject: &str,
    message: &str,
    variables: &mut HashMap<String, String>,
) -> TemplateParts {
    variables.insert("custom_subject".to_string(), subject.to_string());

    // One paragraph per newline-delimited line. Operator text is escaped
    // here because it bypasses variable substitution.
    let paragraphs = message
        .lines()
        .map(|line| format!("<p>{}</p>", escape_html(line)))
        .collect::<Vec<_>>()
        .join("\n");

    let html_body = format!(
        "{}\n{}",
        r#"<h1 style="font-size:20px;margin-top:0;">A message from {{brand_name}}</h1>"#,
        paragraphs
    );

    let text = format!("A message from {{{{brand_name}}}}\n\n{}", message);

    TemplateParts {
        subject: "{{custom_subject}}".to_string(),
        html_body,
        text,
    }
}

//! HTML rendering of `ErrorResponseModel`.
//!
//! Every model value is escaped; the return URI and form fields come from
//! client-supplied input.

use crate::services::authorize::{ErrorResponseModel, ResponseMode, ReturnInfo};

pub fn render(model: &ErrorResponseModel) -> String {
    let return_block = model
        .return_info
        .as_ref()
        .map(render_return_info)
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Error</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #111827; max-width: 600px; margin: 40px auto; padding: 0 20px; }}
        .error {{ padding: 20px; border: 1px solid #fecaca; background: #fef2f2; border-radius: 8px; }}
        .code {{ font-family: monospace; color: #6b7280; }}
        .request-id {{ font-size: 12px; color: #9ca3af; margin-top: 24px; }}
    </style>
</head>
<body>
    <h1>Sorry, there was an error</h1>
    <div class="error">
        <p class="message">{message}</p>
        <p class="code">{code}</p>
    </div>
{return_block}    <p class="request-id">Request Id: {request_id}</p>
</body>
</html>"#,
        message = html_escape(&model.error_message),
        code = html_escape(&model.error_code),
        return_block = return_block,
        request_id = html_escape(&model.request_id),
    )
}

fn render_return_info(info: &ReturnInfo) -> String {
    let client = html_escape(info.client_name.as_deref().unwrap_or(&info.client_id));

    match info.response_mode {
        ResponseMode::FormPost => {
            let fields: String = info
                .form_fields
                .iter()
                .map(|(name, value)| {
                    format!(
                        "        <input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
                        html_escape(name),
                        html_escape(value)
                    )
                })
                .collect();
            format!(
                "    <form method=\"post\" action=\"{}\">\n{}        <button type=\"submit\">Return to {}</button>\n    </form>\n",
                html_escape(&info.uri),
                fields,
                client
            )
        }
        ResponseMode::Query | ResponseMode::Fragment => format!(
            "    <p><a class=\"return\" href=\"{}\">Return to {}</a></p>\n",
            html_escape(&info.uri),
            client
        ),
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

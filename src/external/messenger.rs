use crate::config::MessengerConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::Serialize;
use serde_json::json;

/// 附加在消息下方的行动按钮
#[derive(Debug, Clone, Serialize)]
pub struct MessageButton {
    pub text: String,
    pub url: String,
}

/// Bot API 消息网关。token 按租户传入，客户端复用。
#[derive(Clone)]
pub struct MessengerService {
    client: Client,
    api_base: String,
}

impl MessengerService {
    pub fn new(config: MessengerConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base,
        }
    }

    /// 发送一条文本消息。失败时错误里携带网关返回的原始 body，
    /// 调用方据此判断是否为"用户封禁了 bot"。
    pub async fn send_message(
        &self,
        bot_token: &str,
        chat_id: i64,
        text: &str,
        button: Option<&MessageButton>,
    ) -> AppResult<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, bot_token);

        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(btn) = button {
            body["reply_markup"] = json!({
                "inline_keyboard": [[{ "text": btn.text, "url": btn.url }]]
            });
        }

        let response = self.client.post(&url).json(&body).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::ExternalApiError(error_text))
        }
    }
}

/// 网关错误体是否表明接收者封禁了 bot（子串匹配，
/// 如 "Forbidden: bot was blocked by the user"）。
pub fn is_blocked_error(body: &str) -> bool {
    body.to_ascii_lowercase().contains("blocked")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_error_detection() {
        assert!(is_blocked_error(
            r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#
        ));
        assert!(is_blocked_error("Forbidden: Bot Was BLOCKED by the user"));
    }

    #[test]
    fn test_other_errors_not_blocked() {
        assert!(!is_blocked_error(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#
        ));
        assert!(!is_blocked_error("connection reset by peer"));
    }
}

//! Localized public-facing messages
//!
//! Everything returned to unauthenticated callers goes through here so
//! responses stay in the visitor's language and deliberately vague about
//! internals: the login failure text never distinguishes an unknown
//! account from a wrong password.

use actix_web::HttpRequest;

/// Response language, negotiated from Accept-Language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    Tr,
    En,
}

impl Lang {
    /// Parse an explicit language code, defaulting to Turkish
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(|c| c.trim().to_lowercase()) {
            Some(c) if c.starts_with("en") => Lang::En,
            _ => Lang::Tr,
        }
    }

    /// Negotiate from the Accept-Language header
    pub fn from_request(req: &HttpRequest) -> Self {
        let header = req
            .headers()
            .get("accept-language")
            .and_then(|h| h.to_str().ok());
        Self::from_code(header.and_then(|h| h.split(',').next()))
    }

    pub fn code(&self) -> &'static str {
        match self {
            Lang::Tr => "tr",
            Lang::En => "en",
        }
    }
}

pub fn review_received(lang: Lang) -> &'static str {
    match lang {
        Lang::Tr => "Yorumunuz alındı, teşekkür ederiz.",
        Lang::En => "Your review has been received, thank you.",
    }
}

pub fn rate_limited(lang: Lang) -> &'static str {
    match lang {
        Lang::Tr => "Çok fazla istek gönderdiniz. Lütfen daha sonra tekrar deneyin.",
        Lang::En => "Too many requests. Please try again later.",
    }
}

pub fn invalid_credentials(lang: Lang) -> &'static str {
    match lang {
        Lang::Tr => "E-posta veya şifre hatalı.",
        Lang::En => "Invalid email or password.",
    }
}

pub fn server_error(lang: Lang) -> &'static str {
    match lang {
        Lang::Tr => "Beklenmeyen bir hata oluştu. Lütfen tekrar deneyin.",
        Lang::En => "An unexpected error occurred. Please try again.",
    }
}

pub fn service_unavailable(lang: Lang) -> &'static str {
    match lang {
        Lang::Tr => "Hizmet şu anda kullanılamıyor. Lütfen daha sonra tekrar deneyin.",
        Lang::En => "Service is temporarily unavailable. Please try again later.",
    }
}

pub fn restaurant_not_found(lang: Lang) -> &'static str {
    match lang {
        Lang::Tr => "Restoran bulunamadı.",
        Lang::En => "Restaurant not found.",
    }
}

pub fn missing_field(lang: Lang, field: &str) -> String {
    match lang {
        Lang::Tr => format!("{} alanı zorunludur.", field),
        Lang::En => format!("Field '{}' is required.", field),
    }
}

pub fn invalid_field(lang: Lang, field: &str) -> String {
    match lang {
        Lang::Tr => format!("{} alanı geçersiz.", field),
        Lang::En => format!("Field '{}' is invalid.", field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_from_code() {
        assert_eq!(Lang::from_code(None), Lang::Tr);
        assert_eq!(Lang::from_code(Some("tr")), Lang::Tr);
        assert_eq!(Lang::from_code(Some("en")), Lang::En);
        assert_eq!(Lang::from_code(Some("en-US")), Lang::En);
        assert_eq!(Lang::from_code(Some("de")), Lang::Tr);
    }

    #[test]
    fn test_messages_localized() {
        assert!(invalid_credentials(Lang::Tr).contains("şifre"));
        assert!(invalid_credentials(Lang::En).contains("password"));
        assert_eq!(missing_field(Lang::Tr, "rating"), "rating alanı zorunludur.");
        assert_eq!(missing_field(Lang::En, "rating"), "Field 'rating' is required.");
    }

    #[test]
    fn test_login_failure_text_does_not_leak_account_existence() {
        // The same message must cover unknown-account and wrong-password
        for lang in [Lang::Tr, Lang::En] {
            let msg = invalid_credentials(lang);
            assert!(!msg.to_lowercase().contains("not found"));
            assert!(!msg.to_lowercase().contains("bulunamadı"));
        }
    }
}

//! Heuristic scam signals extracted before calling the model

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use super::submission::{EmailSubmission, SocialMediaSubmission, WebsiteSubmission};
use super::url::ParsedUrl;

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[\w\-._~:/?#\[\]@!$&'()*+,;=%]+").unwrap());
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(?:\+\d{1,3}[\s-]?)?(?:\(?\d{2,4}\)?[\s-]?)?\d{3,4}[\s-]?\d{3,4})").unwrap()
});
static HASHTAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#[\w\x{4e00}-\x{9fff}]+").unwrap());
static MENTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[\w\x{4e00}-\x{9fff}]+").unwrap());
static RANDOM_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-f0-9]{8,}").unwrap());

const MIN_PHONE_LENGTH: usize = 7;
const MAX_HYPHENS_IN_DOMAIN: usize = 2;
const NEW_DOMAIN_THRESHOLD_DAYS: u64 = 30;
const LOW_ENGAGEMENT_RATE: f64 = 0.01;
const HIGH_ENGAGEMENT_RATE: f64 = 0.1;

const SUSPICIOUS_TLDS: &[&str] = &["zip", "mov", "xyz", "top", "click", "country", "gq", "cn", "ru"];
const URL_SHORTENERS: &[&str] = &["bit.ly", "t.co", "goo.gl", "tinyurl.com", "ow.ly", "is.gd"];
const KNOWN_BRANDS: &[&str] = &[
    "google", "facebook", "amazon", "apple", "microsoft", "netflix", "paypal", "ebay", "alibaba",
    "tencent", "baidu", "yahoo",
];
const FORM_KEYWORDS: &[&str] = &["input", "form", "submit", "button"];
const SUSPICIOUS_PATH_KEYWORDS: &[&str] = &["login", "secure", "verify", "confirm"];

type KeywordTable = &'static [(&'static str, &'static [&'static str])];

const EMAIL_KEYWORDS: KeywordTable = &[
    ("otp_request", &["otp", "one-time password", "verification code", "6-digit code"]),
    ("credential_request", &["password", "login", "account details", "pin"]),
    (
        "payment_request",
        &["transfer", "bank", "wire", "crypto", "gift card", "bitcoin", "usdt", "wallet"],
    ),
    (
        "urgency",
        &["urgent", "immediately", "asap", "deadline", "suspend", "suspension", "24 hours", "48 hours"],
    ),
    ("attachment_mention", &["attached", "attachment", ".pdf", ".zip", ".doc", ".xls"]),
];

const SOCIAL_MEDIA_KEYWORDS: KeywordTable = &[
    ("giveaway_mention", &["giveaway", "free", "win", "prize", "contest", "lucky"]),
    (
        "investment_mention",
        &["investment", "profit", "earn", "money", "crypto", "bitcoin", "trading"],
    ),
    (
        "urgency_mention",
        &["urgent", "limited time", "last chance", "hurry", "asap", "deadline"],
    ),
    ("romance_scam", &["love", "relationship", "marriage", "dating", "romance"]),
    ("impersonation", &["official", "verified", "celeb", "celebrity", "brand"]),
    (
        "suspicious_contact",
        &["whatsapp", "telegram", "dm", "direct message", "private message"],
    ),
];

const WEBSITE_KEYWORDS: KeywordTable = &[
    ("login_form", &["login", "sign in", "password", "username", "account"]),
    ("payment_form", &["payment", "credit card", "bank", "transfer", "wire"]),
    (
        "urgency_tactics",
        &["urgent", "limited time", "last chance", "hurry", "asap", "deadline", "suspend"],
    ),
    (
        "authority_impersonation",
        &["government", "official", "bank", "police", "irs", "tax"],
    ),
    (
        "investment_scam",
        &["investment", "profit", "earn", "money", "crypto", "bitcoin", "trading"],
    ),
    (
        "tech_support",
        &["tech support", "computer", "virus", "microsoft", "apple support"],
    ),
    ("lottery_winner", &["lottery", "winner", "prize", "claim", "million"]),
    ("romance_scam", &["love", "relationship", "marriage", "dating", "romance"]),
    ("suspicious_contact", &["whatsapp", "telegram", "dm", "direct message"]),
];

/// Signals for an email: artifacts, sender metadata and keyword heuristics
pub fn email_signals(email: &EmailSubmission) -> Value {
    let text = if email.subject.is_empty() {
        email.content.clone()
    } else {
        format!("{}\n\n{}", email.subject, email.content)
    };

    let urls = extract_urls(&text);
    let url_domains = domains_of(&urls);
    let reply_to = email.reply_to_email.as_deref().unwrap_or_default();
    let from_domain = domain_of_email(&email.from_email);
    let reply_to_domain = domain_of_email(reply_to);
    let reply_to_mismatch = matches!(
        (&from_domain, &reply_to_domain),
        (Some(from), Some(reply)) if from != reply
    );

    let mut heuristics = keyword_flags(EMAIL_KEYWORDS, &text);
    heuristics.insert("has_shortened_link".into(), json!(has_shortener(&url_domains)));
    heuristics.insert("has_suspicious_tld".into(), json!(has_suspicious_tld(&url_domains)));
    heuristics.insert("link_count".into(), json!(urls.len()));

    json!({
        "artifacts": {
            "urls": urls,
            "url_domains": url_domains,
            "emails_in_text": extract_all(&EMAIL_PATTERN, &text),
            "phone_numbers": extract_phone_numbers(&text),
        },
        "email_meta": {
            "from_email": email.from_email,
            "from_domain": from_domain,
            "reply_to_email": reply_to,
            "reply_to_domain": reply_to_domain,
            "reply_to_mismatch": reply_to_mismatch,
        },
        "heuristics": heuristics,
    })
}

/// Signals for a social media post: artifacts, engagement and platform risks
pub fn social_media_signals(post: &SocialMediaSubmission) -> Value {
    let urls = extract_urls(&post.content);
    let url_domains = domains_of(&urls);
    let hashtags = extract_all(&HASHTAG_PATTERN, &post.content);
    let mentions = extract_all(&MENTION_PATTERN, &post.content);
    let platform = post.platform.to_lowercase();
    let lowered = post.content.to_lowercase();

    let keywords = keyword_flags(SOCIAL_MEDIA_KEYWORDS, &post.content);
    let flag = |name: &str| keywords.get(name).and_then(Value::as_bool).unwrap_or(false);
    let shortened = has_shortener(&url_domains);
    let suspicious_tld = has_suspicious_tld(&url_domains);

    let engagement_signals = match (post.engagement_metrics, post.author_followers_count) {
        (Some(metrics), Some(followers)) if followers > 0 => {
            let rate = metrics.total_interactions() as f64 / followers as f64;
            json!({
                "low_engagement_rate": rate < LOW_ENGAGEMENT_RATE,
                "high_engagement_rate": rate > HIGH_ENGAGEMENT_RATE,
                "engagement_to_follower_ratio": rate,
            })
        }
        _ => json!({}),
    };

    let platform_risks = match platform.as_str() {
        "facebook" => json!({
            "fake_giveaway": flag("giveaway_mention") && shortened,
            "impersonation": flag("impersonation") && !post.author_username.starts_with("verified"),
        }),
        "instagram" => json!({
            "fake_giveaway": flag("giveaway_mention") && shortened,
            "suspicious_promotion": flag("investment_mention") && suspicious_tld,
        }),
        "twitter" | "x" => json!({
            "fake_news": flag("impersonation") && shortened,
            "crypto_scam": flag("investment_mention") && lowered.contains("crypto"),
        }),
        "tiktok" => json!({
            "fake_challenge": flag("giveaway_mention") && flag("urgency_mention"),
            "suspicious_promotion": flag("investment_mention") && suspicious_tld,
        }),
        "linkedin" => json!({
            "fake_job": flag("investment_mention") && flag("urgency_mention"),
            "business_scam": flag("investment_mention") && suspicious_tld,
        }),
        _ => json!({}),
    };

    let mut heuristics = keywords.clone();
    heuristics.insert("has_shortened_link".into(), json!(shortened));
    heuristics.insert("has_suspicious_tld".into(), json!(suspicious_tld));
    heuristics.insert("link_count".into(), json!(urls.len()));
    heuristics.insert("hashtag_count".into(), json!(hashtags.len()));
    heuristics.insert("mention_count".into(), json!(mentions.len()));

    json!({
        "artifacts": {
            "urls": urls,
            "url_domains": url_domains,
            "hashtags": hashtags,
            "mentions": mentions,
            "phone_numbers": extract_phone_numbers(&post.content),
        },
        "platform_meta": {
            "platform": platform,
            "author_username": post.author_username,
            "post_url": post.post_url,
            "author_followers_count": post.author_followers_count,
        },
        "engagement_metrics": post.engagement_metrics,
        "engagement_signals": engagement_signals,
        "heuristics": heuristics,
        "platform_risks": platform_risks,
    })
}

/// Signals for a web page: domain shape, TLS facts, forms and keywords
pub fn website_signals(site: &WebsiteSubmission) -> Value {
    let title = site.title.as_deref().unwrap_or_default();
    let content = site.content.as_deref().unwrap_or_default();
    let text = format!("{} {}", title, content).to_lowercase();

    let urls = extract_urls(content);
    let emails = extract_all(&EMAIL_PATTERN, content);
    let phone_numbers = extract_phone_numbers(content);

    let parsed = ParsedUrl::parse(&site.url);
    let domain = parsed.as_ref().map(ParsedUrl::domain).unwrap_or_default();
    let path = parsed.as_ref().map(|u| u.path).unwrap_or_default();
    let scheme = parsed.as_ref().map(|u| u.scheme.to_lowercase()).unwrap_or_default();
    let labels: Vec<&str> = domain.split('.').collect();
    let tld = if labels.len() > 1 { labels[labels.len() - 1] } else { "" };
    let sld = if labels.len() > 2 { labels[labels.len() - 2] } else { "" };

    let metadata = site.metadata.clone().unwrap_or_default();
    let ssl_security = if metadata.is_empty() {
        json!({})
    } else {
        let domain_age_days = metadata
            .get("domain_age_days")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        json!({
            "has_ssl": metadata.get("ssl_valid").and_then(Value::as_bool).unwrap_or(false),
            "ssl_expired": metadata.get("ssl_expired").and_then(Value::as_bool).unwrap_or(false),
            "domain_age_days": domain_age_days,
            "is_new_domain": domain_age_days < NEW_DOMAIN_THRESHOLD_DAYS,
        })
    };

    let mut heuristics = keyword_flags(WEBSITE_KEYWORDS, &text);
    heuristics.insert("link_count".into(), json!(urls.len()));
    heuristics.insert("email_count".into(), json!(emails.len()));
    heuristics.insert("phone_count".into(), json!(phone_numbers.len()));
    let has_input_fields = FORM_KEYWORDS.iter().any(|k| text.contains(k));

    json!({
        "artifacts": {
            "urls": urls,
            "emails": emails,
            "phone_numbers": phone_numbers,
        },
        "domain_analysis": {
            "full_domain": domain,
            "tld": tld,
            "sld": sld,
            "path": path,
            "scheme": scheme,
            "uses_https": scheme == "https",
            "has_suspicious_tld": SUSPICIOUS_TLDS.contains(&tld),
            "has_shortened": URL_SHORTENERS.contains(&domain.as_str()),
            "is_lookalike": is_lookalike_domain(&domain),
        },
        "content_analysis": {
            "title": title,
            "content_length": content.chars().count(),
        },
        "ssl_security": ssl_security,
        "form_indicators": {
            "has_input_fields": has_input_fields,
            "has_password_field": text.contains("password"),
            "has_email_field": text.contains("email"),
        },
        "suspicious_patterns": {
            "random_subdomain": RANDOM_SUBDOMAIN.is_match(&domain),
            "numbers_in_domain": domain.chars().any(|c| c.is_ascii_digit()),
            "multiple_hyphens": domain.matches('-').count() > MAX_HYPHENS_IN_DOMAIN,
            "suspicious_path": SUSPICIOUS_PATH_KEYWORDS.iter().any(|k| path.to_lowercase().contains(k)),
        },
        "heuristics": heuristics,
        "metadata": metadata,
    })
}

fn keyword_flags(table: KeywordTable, text: &str) -> Map<String, Value> {
    let lowered = text.to_lowercase();
    table
        .iter()
        .map(|(category, keywords)| {
            let hit = keywords.iter().any(|k| lowered.contains(k));
            (category.to_string(), Value::Bool(hit))
        })
        .collect()
}

/// Unique matches in order of first appearance
fn extract_all(pattern: &Regex, text: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    pattern
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|found| seen.insert(found.clone()))
        .collect()
}

fn extract_urls(text: &str) -> Vec<String> {
    extract_all(&URL_PATTERN, text)
        .into_iter()
        .map(|url| url.trim_end_matches(['.', ',', ')', ';', '\'']).to_string())
        .collect()
}

fn extract_phone_numbers(text: &str) -> Vec<String> {
    extract_all(&PHONE_PATTERN, text)
        .into_iter()
        .map(|phone| phone.trim().to_string())
        .filter(|phone| phone.len() >= MIN_PHONE_LENGTH)
        .collect()
}

fn domains_of(urls: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    urls.iter()
        .filter_map(|url| ParsedUrl::parse(url).map(|u| u.domain()))
        .filter(|domain| seen.insert(domain.clone()))
        .collect()
}

fn domain_of_email(address: &str) -> Option<String> {
    address
        .rsplit_once('@')
        .map(|(_, domain)| domain.trim().to_lowercase())
        .filter(|domain| !domain.is_empty())
}

fn has_shortener(domains: &[String]) -> bool {
    domains.iter().any(|d| URL_SHORTENERS.contains(&d.as_str()))
}

fn has_suspicious_tld(domains: &[String]) -> bool {
    domains
        .iter()
        .filter_map(|d| d.rsplit_once('.').map(|(_, tld)| tld))
        .any(|tld| SUSPICIOUS_TLDS.contains(&tld))
}

fn is_lookalike_domain(domain: &str) -> bool {
    KNOWN_BRANDS
        .iter()
        .any(|brand| domain.contains(brand) && domain != *brand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::EngagementMetrics;

    #[test]
    fn test_email_signals() {
        let email = EmailSubmission {
            subject: "URGENT: account suspended".to_string(),
            content: "Verify at https://bit.ly/abc or https://secure-login.xyz/verify. \
                      Send your OTP to help@desk.example or call +60 12-345 6789"
                .to_string(),
            from_email: "alerts@bank.example".to_string(),
            reply_to_email: Some("reply@other.example".to_string()),
        };

        let signals = email_signals(&email);

        assert_eq!(
            signals["artifacts"]["url_domains"],
            json!(["bit.ly", "secure-login.xyz"])
        );
        assert_eq!(signals["artifacts"]["urls"][1], "https://secure-login.xyz/verify");
        assert_eq!(signals["artifacts"]["emails_in_text"], json!(["help@desk.example"]));
        assert_eq!(signals["email_meta"]["reply_to_mismatch"], true);
        assert_eq!(signals["heuristics"]["urgency"], true);
        assert_eq!(signals["heuristics"]["otp_request"], true);
        assert_eq!(signals["heuristics"]["has_shortened_link"], true);
        assert_eq!(signals["heuristics"]["has_suspicious_tld"], true);
        assert_eq!(signals["heuristics"]["link_count"], 2);
        assert!(!signals["artifacts"]["phone_numbers"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_email_without_reply_to_has_no_mismatch() {
        let email = EmailSubmission {
            subject: "Lunch".to_string(),
            content: "See you at noon".to_string(),
            from_email: "friend@mail.example".to_string(),
            reply_to_email: None,
        };

        let signals = email_signals(&email);
        assert_eq!(signals["email_meta"]["reply_to_mismatch"], false);
        assert_eq!(signals["heuristics"]["link_count"], 0);
    }

    #[test]
    fn test_social_media_signals() {
        let post = SocialMediaSubmission {
            platform: "Facebook".to_string(),
            content: "Official GIVEAWAY! Win now at https://bit.ly/free #win @brand".to_string(),
            author_username: "brand_official".to_string(),
            post_url: None,
            author_followers_count: Some(10_000),
            engagement_metrics: Some(EngagementMetrics {
                likes: 5,
                comments: 1,
                shares: 0,
                views: 100,
            }),
        };

        let signals = social_media_signals(&post);

        assert_eq!(signals["platform_meta"]["platform"], "facebook");
        assert_eq!(signals["artifacts"]["hashtags"], json!(["#win"]));
        assert_eq!(signals["artifacts"]["mentions"], json!(["@brand"]));
        assert_eq!(signals["platform_risks"]["fake_giveaway"], true);
        assert_eq!(signals["platform_risks"]["impersonation"], true);
        assert_eq!(signals["engagement_signals"]["low_engagement_rate"], true);
    }

    #[test]
    fn test_engagement_rate_with_huge_counts() {
        let post = SocialMediaSubmission {
            platform: "instagram".to_string(),
            content: "Follow for a prize".to_string(),
            author_username: "prize_page".to_string(),
            post_url: None,
            author_followers_count: Some(10),
            engagement_metrics: Some(EngagementMetrics {
                likes: u64::MAX,
                comments: 1,
                shares: 1,
                views: 0,
            }),
        };

        let signals = social_media_signals(&post);

        assert_eq!(signals["engagement_signals"]["high_engagement_rate"], true);
        assert_eq!(signals["engagement_signals"]["low_engagement_rate"], false);
    }

    #[test]
    fn test_website_signals() {
        let mut metadata = Map::new();
        metadata.insert("ssl_valid".to_string(), json!(true));
        metadata.insert("domain_age_days".to_string(), json!(3));

        let site = WebsiteSubmission {
            url: "http://paypal-secure-login-now.xyz/login".to_string(),
            title: Some("Sign in".to_string()),
            content: Some("Enter your password to claim the prize".to_string()),
            metadata: Some(metadata),
        };

        let signals = website_signals(&site);
        let domain = &signals["domain_analysis"];

        assert_eq!(domain["full_domain"], "paypal-secure-login-now.xyz");
        assert_eq!(domain["tld"], "xyz");
        assert_eq!(domain["uses_https"], false);
        assert_eq!(domain["has_suspicious_tld"], true);
        assert_eq!(domain["is_lookalike"], true);
        assert_eq!(signals["suspicious_patterns"]["multiple_hyphens"], true);
        assert_eq!(signals["suspicious_patterns"]["suspicious_path"], true);
        assert_eq!(signals["ssl_security"]["is_new_domain"], true);
        assert_eq!(signals["form_indicators"]["has_password_field"], true);
        assert_eq!(signals["heuristics"]["lottery_winner"], true);
    }
}

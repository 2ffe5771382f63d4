use serde::{Deserialize, Serialize};

/// One job posting returned by the recommendation service.
/// Field names are camelCase on the wire and in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    pub id: String,
    pub title: String,
    pub company_name: String,
    pub company_logo: String,
    pub description_text: String,
    pub formatted_location: String,
    pub link: String,
}

impl RecommendationItem {
    /// Up to two leading characters of the company name, upper-cased.
    /// Shown when the logo image cannot be loaded.
    pub fn logo_fallback(&self) -> String {
        self.company_name
            .chars()
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, company: &str) -> RecommendationItem {
        RecommendationItem {
            id: id.to_string(),
            title: "Backend Engineer".to_string(),
            company_name: company.to_string(),
            company_logo: "https://logo.example/acme.png".to_string(),
            description_text: "Build services.".to_string(),
            formatted_location: "Berlin, Germany".to_string(),
            link: "https://jobs.example/1".to_string(),
        }
    }

    #[test]
    fn test_deserializes_camel_case_payload() {
        let json = r#"{
            "id": "42",
            "title": "Data Scientist",
            "companyName": "Acme",
            "companyLogo": "https://logo.example/acme.png",
            "descriptionText": "Models.",
            "formattedLocation": "Remote",
            "link": "https://jobs.example/42"
        }"#;
        let parsed: RecommendationItem = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.company_name, "Acme");
        assert_eq!(parsed.formatted_location, "Remote");
    }

    #[test]
    fn test_logo_fallback() {
        assert_eq!(item("1", "acme").logo_fallback(), "AC");
        assert_eq!(item("1", "x").logo_fallback(), "X");
        assert_eq!(item("1", "").logo_fallback(), "");
        assert_eq!(item("1", "éclair").logo_fallback(), "ÉC");
    }
}

//! Fallback prompt construction

use crate::config::VerticalHint;

/// Appended to generated corpora so consumers know the content is synthetic
pub const DISCLOSURE_NOTE: &str =
    "[NOTE: This content was AI-generated because the direct site crawl was blocked.]";

/// Suffix added to the display title when generated content is served
pub const SIMULATED_SUFFIX: &str = "(Simulated Demo)";

/// Picks the first vertical whose keywords appear in the domain
pub fn detect_vertical<'a>(domain: &str, verticals: &'a [VerticalHint]) -> Option<&'a VerticalHint> {
    let domain = domain.to_lowercase();
    verticals.iter().find(|vertical| {
        vertical
            .keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && domain.contains(&keyword.to_lowercase()))
    })
}

/// Builds the prompt asking the generator for a simulated crawl export
///
/// The requested output mirrors the corpus layout produced by a real harvest so
/// downstream consumers cannot tell the two formats apart.
pub fn build_fallback_prompt(
    domain: &str,
    target_url: &str,
    vertical: Option<&VerticalHint>,
) -> String {
    let mut prompt = format!(
        "You are a highly advanced web crawler simulator.\n\
         The user is trying to scrape the website \"{url}\" for the company \"{domain}\" \
         to build a customer service chatbot.\n\
         However, the site is blocking bots or is unavailable.\n\n\
         Your task is to GENERATE a realistic, detailed, and comprehensive \"Simulated Website Crawl\" \
         for this company based on your public knowledge of them.\n\n\
         Include:\n\
         1. A rich \"Home Page\" section with their likely value proposition and services.\n\
         2. A \"Services/Products\" section detailing what they offer (be specific for {domain}).\n\
         3. A \"Pricing\" section (can be estimated or standard for the industry).\n\
         4. An \"FAQ\" section with 5-10 common customer questions and answers.\n\
         5. A \"Contact\" section.\n",
        url = target_url,
        domain = domain,
    );

    if let Some(vertical) = vertical {
        if !vertical.instructions.is_empty() {
            prompt.push_str(&format!("6. SPECIAL SECTION: {}\n", vertical.instructions));
        }
    }

    prompt.push_str(&format!(
        "\nFormat the output exactly like a scraped text export:\n\n\
         WEBSITE: {domain} ({url})\n\n\
         --- HOME PAGE ---\n[Generated Home Content...]\n\n\
         --- PAGE: /services ---\n[Generated Services Content...]\n\n\
         --- PAGE: /pricing ---\n[Generated Pricing Content...]\n\n",
        url = target_url,
        domain = domain,
    ));

    if let Some(section) = vertical.and_then(|v| v.section.as_deref()) {
        prompt.push_str(&format!(
            "--- PAGE: {} ---\n[Detailed {} content...]\n\n",
            section,
            section.trim_start_matches('/')
        ));
    }

    prompt.push_str(&format!(
        "--- PAGE: /faq ---\n[Generated FAQ Content...]\n\n\
         --- PAGE: /contact ---\n[Generated Contact Content...]\n\n\
         Make it sound authentic, professional, and specific to the brand \"{}\".\n",
        domain
    ));

    prompt
}

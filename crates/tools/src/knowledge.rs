//! Keyword-matched knowledge base
//!
//! Company policies, schemes, and FAQs with bilingual answers
//! (English + romanized Hindi). Keyword regexes give ~1ms lookups;
//! no retrieval stack is involved.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::ToolReply;

struct KbEntry {
    category: &'static str,
    key: &'static str,
    english: &'static str,
    hindi: &'static str,
}

static KNOWLEDGE_BASE: &[KbEntry] = &[
    KbEntry {
        category: "company_info",
        key: "mission",
        english: "The company aims to make electric mobility accessible and affordable for all \
                  by addressing the high upfront costs of batteries and the lack of charging \
                  infrastructure through a Battery-as-a-Service model.",
        hindi: "Company ka uddeshya electric mobility ko sabke liye sulabh aur sasti banana hai. \
                Yeh battery ki mehengi keemat aur charging infrastructure ki kami ko \
                Battery-as-a-Service model ke zariye hal karti hai.",
    },
    KbEntry {
        category: "company_info",
        key: "founders",
        english: "The company was founded in 2019 by IIT Kanpur graduates Pulkit Khurana and \
                  Siddharth Sikka.",
        hindi: "Company ki sthapna 2019 mein IIT Kanpur ke graduates Pulkit Khurana aur \
                Siddharth Sikka ne ki thi.",
    },
    KbEntry {
        category: "company_info",
        key: "network",
        english: "As of late 2025, the network operates over 1,600 swapping stations across \
                  more than 50 cities in India.",
        hindi: "2025 ke ant tak, network 50 se zyada shehron mein 1,600 se zyada swapping \
                stations chala raha hai.",
    },
    KbEntry {
        category: "driver_schemes",
        key: "welfare_fund",
        english: "The ₹10 crore Driver Welfare Fund 2026 provides insurance coverage, financial \
                  protection, free swaps for top performers, skill development, and referral \
                  rewards for approximately 1 lakh EV drivers.",
        hindi: "₹10 crore ka Driver Welfare Fund 2026 lagbhag 1 lakh EV drivers ko insurance \
                coverage, financial protection, top performers ke liye muft swaps, skill \
                development, aur referral rewards pradaan karta hai.",
    },
    KbEntry {
        category: "driver_schemes",
        key: "insurance",
        english: "Through an insurance partnership the company protects over 40,000 drivers with \
                  coverage for emergency medical treatment, hospitalization, day-care \
                  treatments, and accidental insurance.",
        hindi: "Insurance partnership ke zariye company 40,000 se zyada drivers ko emergency \
                medical treatment, hospitalization, day-care treatments, aur accidental \
                insurance se surakshit karti hai.",
    },
    KbEntry {
        category: "driver_schemes",
        key: "earnings_increase",
        english: "Drivers can increase daily earnings by 50-75%, rising from ₹700-₹800 with \
                  lead-acid batteries to ₹1200-₹1300 with swappable Li-ion batteries.",
        hindi: "Drivers apni daily kamai 50-75% badha sakte hain, lead-acid batteries se \
                ₹700-₹800 se swappable Li-ion batteries se ₹1200-₹1300 tak.",
    },
    KbEntry {
        category: "swapping",
        key: "process",
        english: "A battery swap takes under 2 minutes: locate the nearest station in the app, \
                  scan the QR code to authenticate, deposit the depleted battery in the \
                  designated slot, and retrieve a fully charged one.",
        hindi: "Battery swap mein 2 minute se kam lagta hai: app se nearest station dhundhein, \
                QR code scan karein, khatam battery designated slot mein rakhein, aur puri \
                charge battery lein.",
    },
    KbEntry {
        category: "swapping",
        key: "cost",
        english: "A single swap costs between ₹100 and ₹150.",
        hindi: "Ek swap ka daam ₹100 se ₹150 ke beech hota hai.",
    },
    KbEntry {
        category: "swapping",
        key: "range",
        english: "A set of swappable batteries provides 65-75 km effective range.",
        hindi: "Swappable batteries ka ek set 65-75 km ki effective range deta hai.",
    },
    KbEntry {
        category: "policies",
        key: "home_charging",
        english: "Charging batteries at home is strictly prohibited. Batteries must only be \
                  charged at authorized designated stations. Unauthorized charging leads to \
                  penalties, BMS damage, and contract termination.",
        hindi: "Ghar par battery charge karna sakht mana hai. Batteries sirf authorized \
                designated stations par hi charge honi chahiye. Bina ijazat charging karne par \
                penalty, BMS damage, aur contract termination hota hai.",
    },
    KbEntry {
        category: "policies",
        key: "theft_damage",
        english: "Drivers are liable for compensation if a battery is lost or damaged beyond \
                  repair. The minimum payable equals the battery pack cost. The Driver Welfare \
                  Fund 2026 provides some protection for such cases.",
        hindi: "Agar battery kho jaye ya marammat se pare kharab ho jaye to drivers ko muavza \
                dena hoga. Kam se kam battery pack ki keemat deni hogi. Driver Welfare Fund \
                2026 aise cases mein kuch suraksha deta hai.",
    },
    KbEntry {
        category: "policies",
        key: "troubleshooting",
        english: "For battery issues: verify credentials, check for loose connections, ensure \
                  the battery is not paired with another device, and update the app to the \
                  latest version.",
        hindi: "Battery ki samasya ke liye: credentials verify karein, loose connections check \
                karein, ensure karein ki battery kisi aur device ke saath paired nahi hai, aur \
                app ko latest version mein update karein.",
    },
    KbEntry {
        category: "support",
        key: "helpline",
        english: "The 24x7 support helpline is +91 8055 300 400.",
        hindi: "24x7 support helpline hai +91 8055 300 400.",
    },
    KbEntry {
        category: "support",
        key: "stuck_battery",
        english: "Use the Voice Support feature in the driver app to send a voice note with \
                  your location and issue, and the nearest-station tool for directions to the \
                  closest swap point.",
        hindi: "Driver app mein Voice Support feature use karein apni location aur issue ke \
                saath voice note bhejne ke liye, aur nearest-station tool se sabse nazdeeki \
                swap point ke directions lein.",
    },
];

/// Keyword regex → knowledge base entry index, checked in order
static KEYWORD_MAPPINGS: Lazy<Vec<(Regex, usize)>> = Lazy::new(|| {
    let patterns: &[(&str, &str, &str)] = &[
        ("mission|goal|aim|uddeshya", "company_info", "mission"),
        ("founder|who started|kisne banaya|owner|malik", "company_info", "founders"),
        ("stations|kitne station|network", "company_info", "network"),
        ("welfare fund|driver fund|10 crore", "driver_schemes", "welfare_fund"),
        ("insurance|bima|protection", "driver_schemes", "insurance"),
        (
            "earnings|kamai|kitna milega|income increase",
            "driver_schemes",
            "earnings_increase",
        ),
        ("swap process|kaise karte|how to swap", "swapping", "process"),
        ("swap cost|kitna paisa|price|rate", "swapping", "cost"),
        ("range|kitna chalega|distance", "swapping", "range"),
        (
            "home charging|ghar pe charge|charge at home",
            "policies",
            "home_charging",
        ),
        ("theft|chori|damage|lost battery", "policies", "theft_damage"),
        ("troubleshoot|problem|issue|kaam nahi", "policies", "troubleshooting"),
        ("helpline|phone|call|contact", "support", "helpline"),
        ("stuck|emergency|battery dead", "support", "stuck_battery"),
    ];
    patterns
        .iter()
        .filter_map(|(pattern, category, key)| {
            let index = KNOWLEDGE_BASE
                .iter()
                .position(|e| e.category == *category && e.key == *key)?;
            Some((Regex::new(pattern).ok()?, index))
        })
        .collect()
});

// Romanized Hindi markers; two or more in a query flips the answer language.
const HINDI_INDICATORS: &[&str] = &[
    "kya", "hai", "kaise", "kahan", "kitna", "kaun", "kab", "kyun", "mera", "meri", "aap", "hum",
    "yeh", "woh", "kis", "batao", "dikhao", "bataiye", "chahiye", "milega", "hoga", "tha", "thi",
    "kar", "ho", "ja", "le", "de", "se", "ke", "ko", "mein", "par",
];

const MAX_SPEECH_CHARS: usize = 500;

/// Spoken fallback when nothing matches
pub const NOT_FOUND_SPEECH: &str = "Maaf kijiye, is sawaal ka jawaab mere paas abhi nahi hai. \
     Kya main aapko kisi aur cheez mein madad kar sakti hoon?";

/// Keyword-matched knowledge lookup
#[derive(Default)]
pub struct KnowledgeBase;

/// A knowledge base answer, already shaped for synthesis
#[derive(Debug, Clone)]
pub struct KnowledgeAnswer {
    pub found: bool,
    pub category: Option<&'static str>,
    pub speech: String,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self
    }

    /// Search for an answer in the language the query was asked in
    pub fn search(&self, query: &str) -> KnowledgeAnswer {
        let query_lower = query.to_lowercase();
        for (pattern, index) in KEYWORD_MAPPINGS.iter() {
            if pattern.is_match(&query_lower) {
                let entry = &KNOWLEDGE_BASE[*index];
                tracing::info!(category = entry.category, key = entry.key, "Knowledge base hit");
                let raw = if is_romanized_hindi(&query_lower) {
                    entry.hindi
                } else {
                    entry.english
                };
                return KnowledgeAnswer {
                    found: true,
                    category: Some(entry.category),
                    speech: clean_for_tts(raw),
                };
            }
        }
        tracing::info!(query = %query, "No knowledge base match");
        KnowledgeAnswer {
            found: false,
            category: None,
            speech: NOT_FOUND_SPEECH.to_string(),
        }
    }

    /// Dispatcher-facing wrapper
    pub fn search_reply(&self, query: &str) -> ToolReply {
        ToolReply::speech_only(self.search(query).speech)
    }
}

fn is_romanized_hindi(query_lower: &str) -> bool {
    let count = HINDI_INDICATORS
        .iter()
        .filter(|word| {
            query_lower
                .unicode_words()
                .any(|w| w.eq_ignore_ascii_case(word))
        })
        .count();
    count >= 2
}

/// Rewrite symbols and acronyms the synthesizer would mangle, then cap
/// the length at a sentence boundary.
fn clean_for_tts(text: &str) -> String {
    let mut speech = text
        .replace('₹', "rupees ")
        .replace('%', " percent")
        .replace("CO2", "carbon dioxide")
        .replace("BMS", "battery management system")
        .replace("QR", "Q R");

    if speech.chars().count() > MAX_SPEECH_CHARS {
        let cut: String = speech.chars().take(MAX_SPEECH_CHARS).collect();
        speech = match cut.rfind('.') {
            Some(pos) if pos > 200 => cut[..=pos].to_string(),
            _ => cut,
        };
    }
    speech
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_query_gets_english_answer() {
        let kb = KnowledgeBase::new();
        let answer = kb.search("how much does a swap cost?");
        assert!(answer.found);
        assert_eq!(answer.category, Some("swapping"));
        assert!(answer.speech.contains("costs between"));
    }

    #[test]
    fn hindi_query_gets_hindi_answer() {
        let kb = KnowledgeBase::new();
        let answer = kb.search("swap cost kitna hai bhai");
        assert!(answer.found);
        assert!(answer.speech.contains("daam"));
    }

    #[test]
    fn rupee_sign_is_spoken() {
        let kb = KnowledgeBase::new();
        let answer = kb.search("how much does a swap cost?");
        assert!(!answer.speech.contains('₹'));
        assert!(answer.speech.contains("rupees"));
    }

    #[test]
    fn unknown_query_falls_back() {
        let kb = KnowledgeBase::new();
        let answer = kb.search("tell me about the weather");
        assert!(!answer.found);
        assert_eq!(answer.speech, NOT_FOUND_SPEECH);
    }
}

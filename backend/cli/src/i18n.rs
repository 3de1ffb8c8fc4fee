//! English/Nepali catalog for interface strings.
//!
//! Only the interface chrome is translated; analysis content is shown as
//! the model returned it.

use plantdoc_core::Language;

#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    lang: Language,
}

impl Catalog {
    pub fn new(lang: Language) -> Self {
        Self { lang }
    }

    fn pick(&self, en: &'static str, ne: &'static str) -> &'static str {
        match self.lang {
            Language::En => en,
            Language::Ne => ne,
        }
    }

    pub fn analyzing(&self) -> &'static str {
        self.pick("Analyzing Image...", "छवि विश्लेषण गर्दै...")
    }

    pub fn identifying(&self) -> &'static str {
        self.pick("Identifying Plant...", "बिरुवा पहिचान गर्दै...")
    }

    pub fn care_guide(&self) -> &'static str {
        self.pick("Care Guide", "हेरचाह गाइड")
    }

    pub fn care_level(&self) -> &'static str {
        self.pick("Care Level", "हेरचाह स्तर")
    }

    pub fn watering(&self) -> &'static str {
        self.pick("Watering", "पानी दिने")
    }

    pub fn light_requirements(&self) -> &'static str {
        self.pick("Light Requirements", "प्रकाश आवश्यकताहरू")
    }

    pub fn temperature(&self) -> &'static str {
        self.pick("Temperature", "तापक्रम")
    }

    pub fn toxicity_warning(&self) -> &'static str {
        self.pick("Toxicity Warning", "विषाक्तता चेतावनी")
    }

    pub fn description(&self) -> &'static str {
        self.pick("Description", "विवरण")
    }

    pub fn origin(&self) -> &'static str {
        self.pick("Origin", "उत्पत्ति")
    }

    pub fn match_label(&self) -> &'static str {
        self.pick("Match", "मिलान")
    }

    pub fn save_collection(&self) -> &'static str {
        self.pick("Save to Collection", "संग्रहमा सुरक्षित गर्नुहोस्")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_languages_have_distinct_strings() {
        let en = Catalog::new(Language::En);
        let ne = Catalog::new(Language::Ne);
        assert_eq!(en.care_guide(), "Care Guide");
        assert_ne!(en.care_guide(), ne.care_guide());
        assert_ne!(en.identifying(), ne.identifying());
    }
}

//! Built-in language catalog.
//!
//! This is data, not logic: the languages published at startup and the
//! cultural contexts attached to them.

use super::language::{
    CulturalContext, CulturalReference, Dialect, FormalityLevel, Language, ReligiousContext,
    Script, Severity, Substitution, Taboo, TextDirection,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn level(name: &str, description: &str, markers: &[&str], subs: &[(&str, &str)]) -> FormalityLevel {
    FormalityLevel {
        name: name.to_string(),
        description: description.to_string(),
        markers: strings(markers),
        substitutions: subs
            .iter()
            .map(|(from, to)| Substitution {
                from: from.to_string(),
                to: to.to_string(),
            })
            .collect(),
    }
}

fn taboo(category: &str, description: &str, severity: Severity, alternatives: &[&str]) -> Taboo {
    Taboo {
        category: category.to_string(),
        description: description.to_string(),
        severity,
        alternatives: strings(alternatives),
    }
}

fn reference(name: &str, kind: &str, traditions: &[&str]) -> CulturalReference {
    CulturalReference {
        name: name.to_string(),
        kind: kind.to_string(),
        traditions: strings(traditions),
    }
}

fn religion(religion: &str, dietary: &[&str], practices: &[&str]) -> ReligiousContext {
    ReligiousContext {
        religion: religion.to_string(),
        dietary_restrictions: strings(dietary),
        practices: strings(practices),
    }
}

#[allow(clippy::too_many_arguments)]
fn language(
    code: &str,
    name: &str,
    native_name: &str,
    family: &str,
    regions: &[&str],
    scripts: &[Script],
    direction: TextDirection,
    context: Option<CulturalContext>,
) -> Language {
    Language {
        code: code.to_string(),
        name: name.to_string(),
        native_name: native_name.to_string(),
        family: family.to_string(),
        regions: strings(regions),
        scripts: scripts.to_vec(),
        direction,
        cultural_context: context,
        dialects: Vec::new(),
    }
}

/// Languages published at startup.
pub fn default_languages() -> Vec<Language> {
    let mut arabic = language(
        "ar",
        "Arabic",
        "العربية",
        "Afro-Asiatic",
        &["SA", "EG", "AE", "MA"],
        &[Script::Arabic],
        TextDirection::Rtl,
        Some(arabic_context()),
    );
    arabic.dialects = vec![
        Dialect {
            code: "ar-EG".into(),
            name: "Egyptian Arabic".into(),
            region: Some("EG".into()),
        },
        Dialect {
            code: "ar-AE".into(),
            name: "Gulf Arabic".into(),
            region: Some("AE".into()),
        },
    ];

    let mut malayalam = language(
        "ml",
        "Malayalam",
        "മലയാളം",
        "Dravidian",
        &["IN"],
        &[Script::Malayalam],
        TextDirection::Ltr,
        Some(malayalam_context()),
    );
    malayalam.dialects = vec![Dialect {
        code: "ml-IN-x-malabar".into(),
        name: "Malabar Malayalam".into(),
        region: Some("IN".into()),
    }];

    vec![
        language(
            "en",
            "English",
            "English",
            "Indo-European",
            &["US", "GB", "IN", "AU"],
            &[Script::Latin],
            TextDirection::Ltr,
            Some(english_context()),
        ),
        language(
            "es",
            "Spanish",
            "Español",
            "Indo-European",
            &["ES", "MX", "AR"],
            &[Script::Latin],
            TextDirection::Ltr,
            Some(spanish_context()),
        ),
        language(
            "fr",
            "French",
            "Français",
            "Indo-European",
            &["FR", "CA", "BE"],
            &[Script::Latin],
            TextDirection::Ltr,
            Some(french_context()),
        ),
        language(
            "de",
            "German",
            "Deutsch",
            "Indo-European",
            &["DE", "AT", "CH"],
            &[Script::Latin],
            TextDirection::Ltr,
            Some(german_context()),
        ),
        malayalam,
        language(
            "hi",
            "Hindi",
            "हिन्दी",
            "Indo-European",
            &["IN"],
            &[Script::Devanagari],
            TextDirection::Ltr,
            Some(hindi_context()),
        ),
        language(
            "ta",
            "Tamil",
            "தமிழ்",
            "Dravidian",
            &["IN", "LK", "SG"],
            &[Script::Tamil],
            TextDirection::Ltr,
            Some(tamil_context()),
        ),
        arabic,
        language(
            "ja",
            "Japanese",
            "日本語",
            "Japonic",
            &["JP"],
            &[Script::Hiragana, Script::Katakana, Script::Han],
            TextDirection::Ltr,
            Some(japanese_context()),
        ),
        language(
            "zh",
            "Chinese",
            "中文",
            "Sino-Tibetan",
            &["CN", "TW", "SG"],
            &[Script::Han],
            TextDirection::Ltr,
            Some(chinese_context()),
        ),
    ]
}

/// Region-qualified contexts indexed under `code_region`.
pub fn regional_contexts() -> Vec<(String, CulturalContext)> {
    let mut indian_english = english_context();
    indian_english.references = vec![
        reference("Diwali", "festival", &["lamps", "sweets", "rangoli"]),
        reference("Holi", "spring_festival", &["colours"]),
        reference("Christmas", "winter_festival", &["carols", "cake"]),
    ];
    indian_english.religious_contexts = vec![religion("Hinduism", &["beef"], &["vegetarian fasting days"])];

    vec![("en_IN".to_string(), indian_english)]
}

fn english_context() -> CulturalContext {
    CulturalContext {
        formality_levels: vec![
            level(
                "formal",
                "Professional, polite register",
                &["full sentences", "no contractions"],
                &[("hi", "hello"), ("thanks", "thank you"), ("yeah", "yes")],
            ),
            level(
                "informal",
                "Everyday conversational register",
                &["contractions allowed"],
                &[("hello", "hi"), ("thank you", "thanks")],
            ),
        ],
        taboos: Vec::new(),
        references: vec![
            reference("Thanksgiving", "harvest_festival", &["turkey dinner", "family gathering"]),
            reference("New Year", "new_year", &["fireworks", "resolutions"]),
            reference("Christmas", "winter_festival", &["gift giving", "tree decoration"]),
        ],
        religious_contexts: Vec::new(),
    }
}

fn spanish_context() -> CulturalContext {
    CulturalContext {
        formality_levels: vec![
            level("formal", "Address with usted", &["usted"], &[("tú", "usted"), ("tu", "su")]),
            level("informal", "Address with tú", &["tú"], &[("usted", "tú")]),
        ],
        taboos: Vec::new(),
        references: vec![
            reference("Navidad", "winter_festival", &["nochebuena"]),
            reference("Año Nuevo", "new_year", &["doce uvas"]),
            reference("Día de los Muertos", "remembrance", &["ofrendas"]),
        ],
        religious_contexts: Vec::new(),
    }
}

fn french_context() -> CulturalContext {
    CulturalContext {
        formality_levels: vec![
            level("formal", "Vouvoiement", &["vous"], &[("tu", "vous"), ("salut", "bonjour")]),
            level("informal", "Tutoiement", &["tu"], &[("vous", "tu"), ("bonjour", "salut")]),
        ],
        taboos: Vec::new(),
        references: vec![
            reference("Noël", "winter_festival", &["réveillon"]),
            reference("Nouvel An", "new_year", &["bisous à minuit"]),
        ],
        religious_contexts: Vec::new(),
    }
}

fn german_context() -> CulturalContext {
    CulturalContext {
        formality_levels: vec![
            level("formal", "Siezen", &["Sie"], &[("du", "Sie"), ("hallo", "guten Tag")]),
            level("informal", "Duzen", &["du"], &[("Sie", "du")]),
        ],
        taboos: Vec::new(),
        references: vec![
            reference("Weihnachten", "winter_festival", &["Adventskranz"]),
            reference("Neujahr", "new_year", &["Bleigießen"]),
            reference("Erntedankfest", "harvest_festival", &["Erntekrone"]),
        ],
        religious_contexts: Vec::new(),
    }
}

fn malayalam_context() -> CulturalContext {
    CulturalContext {
        formality_levels: vec![
            level(
                "formal",
                "Polite register using നിങ്ങൾ",
                &["use plural honorific pronouns", "avoid familiar address"],
                &[("നീ", "നിങ്ങൾ"), ("എടാ", "സുഹൃത്തേ")],
            ),
            level(
                "respectful",
                "Deferential register for elders using താങ്കൾ",
                &["use താങ്കൾ", "add ചേട്ടൻ/ചേച്ചി suffixes"],
                &[("നീ", "താങ്കൾ"), ("നിങ്ങൾ", "താങ്കൾ")],
            ),
            level(
                "informal",
                "Familiar register between friends",
                &["use നീ"],
                &[("നിങ്ങൾ", "നീ")],
            ),
        ],
        taboos: vec![
            taboo("address", "എടാ", Severity::Severe, &["സുഹൃത്തേ"]),
            taboo("gesture", "left hand", Severity::Moderate, &["right hand"]),
        ],
        references: vec![
            reference("Onam", "harvest_festival", &["sadya", "pookalam", "vallam kali"]),
            reference("Vishu", "new_year", &["vishukkani", "kaineettam"]),
            reference("Christmas", "winter_festival", &["star lanterns", "plum cake"]),
        ],
        religious_contexts: vec![
            religion("Hinduism", &["beef", "ബീഫ്"], &["temple visits", "Sabarimala vratham"]),
            religion("Islam", &["pork", "alcohol", "പന്നിയിറച്ചി"], &["Ramadan fasting"]),
        ],
    }
}

fn hindi_context() -> CulturalContext {
    CulturalContext {
        formality_levels: vec![
            level("formal", "Address with आप", &["आप"], &[("तू", "आप"), ("तुम", "आप")]),
            level("respectful", "Honorific जी suffix", &["जी"], &[("तुम", "आप")]),
            level("informal", "Address with तुम", &["तुम"], &[("आप", "तुम")]),
        ],
        taboos: vec![taboo("gesture", "left hand", Severity::Moderate, &["right hand"])],
        references: vec![
            reference("Diwali", "festival", &["diyas", "rangoli", "mithai"]),
            reference("Holi", "spring_festival", &["gulal", "bhang"]),
            reference("Makar Sankranti", "harvest_festival", &["kite flying"]),
        ],
        religious_contexts: vec![
            religion("Hinduism", &["beef", "गोमांस"], &["puja", "vrat"]),
            religion("Jainism", &["onion", "garlic", "प्याज"], &["ahimsa"]),
        ],
    }
}

fn tamil_context() -> CulturalContext {
    CulturalContext {
        formality_levels: vec![
            level("formal", "Address with நீங்கள்", &["நீங்கள்"], &[("நீ", "நீங்கள்")]),
            level("informal", "Address with நீ", &["நீ"], &[("நீங்கள்", "நீ")]),
        ],
        taboos: vec![taboo("gesture", "left hand", Severity::Moderate, &["right hand"])],
        references: vec![
            reference("Pongal", "harvest_festival", &["kolam", "sugarcane"]),
            reference("Puthandu", "new_year", &["mango pachadi"]),
            reference("Deepavali", "festival", &["oil bath", "crackers"]),
        ],
        religious_contexts: vec![religion("Hinduism", &["beef", "மாட்டிறைச்சி"], &["temple festivals"])],
    }
}

fn arabic_context() -> CulturalContext {
    CulturalContext {
        formality_levels: vec![
            level("formal", "Modern Standard Arabic with honorifics", &["حضرتك"], &[]),
            level("informal", "Colloquial dialect", &["enta/enti"], &[]),
        ],
        taboos: vec![
            taboo("gesture", "left hand", Severity::Moderate, &["right hand"]),
            taboo("food", "pig", Severity::Severe, &["animal"]),
        ],
        references: vec![
            reference("Eid al-Fitr", "festival", &["Eid prayer", "sweets"]),
            reference("Ramadan", "religious_observance", &["iftar", "suhoor"]),
            reference("Hijri New Year", "new_year", &["reflection"]),
        ],
        religious_contexts: vec![religion(
            "Islam",
            &["pork", "alcohol", "خنزير", "كحول"],
            &["five daily prayers", "Ramadan fasting"],
        )],
    }
}

fn japanese_context() -> CulturalContext {
    CulturalContext {
        formality_levels: vec![
            level("formal", "Teineigo (です/ます)", &["です", "ます"], &[("だ", "です")]),
            level("honorific", "Keigo for superiors and customers", &["いらっしゃる", "おっしゃる"], &[("いる", "いらっしゃる")]),
            level("casual", "Plain form between friends", &["だ"], &[("です", "だ")]),
        ],
        taboos: vec![
            taboo("number", "四", Severity::Mild, &["よん"]),
            taboo("gift", "white chrysanthemum", Severity::Moderate, &["seasonal flowers"]),
        ],
        references: vec![
            reference("Oshogatsu", "new_year", &["osechi", "hatsumode"]),
            reference("Obon", "festival", &["bon odori", "lanterns"]),
            reference("Tsukimi", "harvest_festival", &["dango", "susuki grass"]),
        ],
        religious_contexts: Vec::new(),
    }
}

fn chinese_context() -> CulturalContext {
    CulturalContext {
        formality_levels: vec![
            level("formal", "Address with 您", &["您"], &[("你", "您")]),
            level("informal", "Address with 你", &["你"], &[("您", "你")]),
        ],
        taboos: vec![
            taboo("number", "四", Severity::Mild, &["两个二"]),
            taboo("gift", "送钟", Severity::Severe, &["送礼物"]),
        ],
        references: vec![
            reference("Spring Festival", "new_year", &["red envelopes", "dumplings"]),
            reference("Mid-Autumn Festival", "harvest_festival", &["mooncakes"]),
            reference("Dragon Boat Festival", "festival", &["zongzi", "boat races"]),
        ],
        religious_contexts: vec![religion("Buddhism", &["meat"], &["vegetarian days"])],
    }
}

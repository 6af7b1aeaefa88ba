//! Immutable medical vocabulary shared by the normalizer, feature builder,
//! and augmentation generator.

use std::collections::{HashMap, HashSet};

/// A named group of keywords matched against joined symptom text.
#[derive(Debug, Clone)]
pub struct KeywordGroup {
    /// Group identifier (e.g. "respiratory", "severe").
    pub name: &'static str,
    /// Keywords checked with substring matching.
    pub keywords: Vec<&'static str>,
}

impl KeywordGroup {
    fn new(name: &'static str, keywords: &[&'static str]) -> Self {
        Self {
            name,
            keywords: keywords.to_vec(),
        }
    }

    /// Check whether any keyword of this group occurs in the given text.
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|keyword| text.contains(keyword))
    }
}

/// Colloquial phrase to canonical medical phrase pairs.
const SYNONYM_PAIRS: &[(&str, &str)] = &[
    ("stomach pain", "abdominal pain"),
    ("belly pain", "abdominal pain"),
    ("tummy ache", "abdominal pain"),
    ("throwing up blood", "hematemesis"),
    ("throwing up", "vomiting"),
    ("puking", "vomiting"),
    ("feeling sick", "nausea"),
    ("queasy", "nausea"),
    ("high temperature", "fever"),
    ("temp", "fever"),
    ("runny nose", "nasal discharge"),
    ("stuffy nose", "nasal congestion"),
    ("sore throat", "throat pain"),
    ("trouble breathing", "shortness of breath"),
    ("hard to breathe", "shortness of breath"),
    ("can't breathe", "shortness of breath"),
    ("tired", "fatigue"),
    ("exhausted", "fatigue"),
    ("weak", "fatigue"),
    ("dizzy", "dizziness"),
    ("lightheaded", "dizziness"),
    ("blood in stool", "hematochezia"),
    ("blood in urine", "hematuria"),
    ("peeing blood", "hematuria"),
    ("can't pee", "urinary retention"),
    ("hard to pee", "dysuria"),
    ("painful urination", "dysuria"),
    ("burning when peeing", "dysuria"),
];

/// Common English stop words removed before vectorization.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "am", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "below", "between", "both", "but", "by", "can",
    "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from", "further",
    "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how", "i", "if",
    "in", "into", "is", "it", "its", "just", "me", "more", "most", "my", "no", "nor", "not",
    "now", "of", "off", "on", "once", "only", "or", "other", "our", "out", "over", "own", "s",
    "same", "she", "should", "so", "some", "such", "t", "than", "that", "the", "their", "them",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "you", "your",
];

/// Medically significant terms exempted from stop-word removal.
const MEDICAL_TERMS: &[&str] = &[
    "pain",
    "fever",
    "nausea",
    "vomiting",
    "cough",
    "headache",
    "fatigue",
    "swelling",
    "bleeding",
    "discharge",
    "rash",
    "itching",
    "burning",
    "shortness",
    "breath",
    "chest",
    "abdominal",
    "pelvic",
    "urination",
    "diarrhea",
    "constipation",
    "appetite",
    "weight",
    "blood",
    "urine",
];

/// Immutable medical vocabulary: synonym pairs, body-system and severity
/// keyword groups, stop words, and the symptom tables used by augmentation.
///
/// Constructed once at startup and passed explicitly to the components that
/// need it. All lookup tables are frozen after construction.
#[derive(Debug, Clone)]
pub struct MedicalLexicon {
    body_systems: Vec<KeywordGroup>,
    severity_bands: Vec<KeywordGroup>,
    stop_words: HashSet<&'static str>,
    synonyms: Vec<(&'static str, &'static str)>,
    symptom_variations: HashMap<&'static str, Vec<&'static str>>,
    system_symptoms: Vec<(&'static str, Vec<&'static str>)>,
}

impl Default for MedicalLexicon {
    fn default() -> Self {
        let body_systems = vec![
            KeywordGroup::new(
                "respiratory",
                &["cough", "breath", "chest", "lung", "nasal", "throat", "sneezing"],
            ),
            KeywordGroup::new(
                "cardiovascular",
                &["chest pain", "heart", "blood pressure", "palpitation"],
            ),
            KeywordGroup::new(
                "gastrointestinal",
                &[
                    "abdominal",
                    "stomach",
                    "nausea",
                    "vomiting",
                    "diarrhea",
                    "constipation",
                    "appetite",
                ],
            ),
            KeywordGroup::new(
                "genitourinary",
                &["urination", "urine", "pelvic", "genital", "kidney", "bladder"],
            ),
            KeywordGroup::new(
                "neurological",
                &["headache", "dizziness", "confusion", "seizure", "numbness", "weakness"],
            ),
            KeywordGroup::new(
                "dermatological",
                &["rash", "itching", "skin", "lesion", "swelling"],
            ),
            KeywordGroup::new(
                "musculoskeletal",
                &["joint", "muscle", "bone", "back", "neck", "limb"],
            ),
            KeywordGroup::new(
                "endocrine",
                &["weight", "thirst", "urination", "fatigue", "temperature"],
            ),
        ];

        let severity_bands = vec![
            KeywordGroup::new(
                "severe",
                &["severe", "intense", "acute", "sudden", "high fever", "profound"],
            ),
            KeywordGroup::new(
                "mild",
                &["mild", "low-grade", "slight", "minor", "mild fever"],
            ),
            KeywordGroup::new(
                "chronic",
                &["chronic", "persistent", "recurrent", "ongoing", "long-term"],
            ),
        ];

        let mut stop_words: HashSet<&'static str> = STOP_WORDS.iter().copied().collect();
        for term in MEDICAL_TERMS {
            stop_words.remove(term);
        }

        let symptom_variations: HashMap<&'static str, Vec<&'static str>> = [
            ("pain", vec!["ache", "discomfort", "soreness", "tenderness"]),
            ("fever", vec!["high temperature", "elevated temperature", "pyrexia"]),
            ("nausea", vec!["feeling sick", "queasy", "sick to stomach"]),
            ("vomiting", vec!["throwing up", "puking", "emesis"]),
            ("fatigue", vec!["tiredness", "exhaustion", "weakness", "lethargy"]),
            ("headache", vec!["head pain", "cephalgia", "head ache"]),
            ("cough", vec!["coughing", "hacking", "productive cough", "dry cough"]),
            (
                "shortness of breath",
                vec!["difficulty breathing", "trouble breathing", "dyspnea"],
            ),
            (
                "chest pain",
                vec!["chest discomfort", "chest pressure", "thoracic pain"],
            ),
            (
                "abdominal pain",
                vec!["stomach pain", "belly ache", "tummy pain"],
            ),
            (
                "diarrhea",
                vec!["loose stools", "watery stools", "frequent bowel movements"],
            ),
            (
                "constipation",
                vec!["hard stools", "difficulty passing stool", "infrequent bowel movements"],
            ),
            ("rash", vec!["skin rash", "eruption", "skin irritation"]),
            ("itching", vec!["pruritus", "scratching", "itchy sensation"]),
            ("swelling", vec!["edema", "inflammation", "puffiness"]),
            ("bleeding", vec!["hemorrhage", "blood loss", "hemorrhaging"]),
            ("dizziness", vec!["lightheadedness", "vertigo", "feeling faint"]),
            (
                "weight loss",
                vec!["unintended weight loss", "weight reduction", "slimming"],
            ),
            (
                "loss of appetite",
                vec!["decreased appetite", "poor appetite", "anorexia"],
            ),
        ]
        .into_iter()
        .collect();

        let system_symptoms = vec![
            (
                "respiratory",
                vec![
                    "cough",
                    "shortness of breath",
                    "chest pain",
                    "wheezing",
                    "sneezing",
                    "nasal discharge",
                    "nasal congestion",
                    "throat pain",
                ],
            ),
            (
                "cardiovascular",
                vec![
                    "chest pain",
                    "shortness of breath",
                    "palpitations",
                    "dizziness",
                    "fatigue",
                    "swelling in legs",
                    "rapid heartbeat",
                ],
            ),
            (
                "gastrointestinal",
                vec![
                    "abdominal pain",
                    "nausea",
                    "vomiting",
                    "diarrhea",
                    "constipation",
                    "loss of appetite",
                    "bloating",
                    "heartburn",
                ],
            ),
            (
                "genitourinary",
                vec![
                    "dysuria",
                    "frequent urination",
                    "hematuria",
                    "pelvic pain",
                    "genital discharge",
                ],
            ),
            (
                "neurological",
                vec![
                    "headache",
                    "dizziness",
                    "confusion",
                    "numbness",
                    "weakness",
                    "seizures",
                    "memory problems",
                ],
            ),
            (
                "dermatological",
                vec![
                    "rash",
                    "itching",
                    "skin lesions",
                    "swelling",
                    "redness",
                    "dry skin",
                ],
            ),
            (
                "musculoskeletal",
                vec![
                    "joint pain",
                    "muscle pain",
                    "back pain",
                    "stiffness",
                    "swelling",
                ],
            ),
            (
                "endocrine",
                vec![
                    "weight loss",
                    "fatigue",
                    "thirst",
                    "frequent urination",
                    "temperature intolerance",
                ],
            ),
        ];

        Self {
            body_systems,
            severity_bands,
            stop_words,
            synonyms: SYNONYM_PAIRS.to_vec(),
            symptom_variations,
            system_symptoms,
        }
    }
}

impl MedicalLexicon {
    /// Create the default lexicon.
    pub fn new() -> Self {
        Self::default()
    }

    /// The eight body-system keyword groups, in fixed feature order.
    pub fn body_systems(&self) -> &[KeywordGroup] {
        &self.body_systems
    }

    /// The three severity keyword groups (severe, mild, chronic), in fixed
    /// feature order.
    pub fn severity_bands(&self) -> &[KeywordGroup] {
        &self.severity_bands
    }

    /// Check whether a token is a stop word (medical terms are exempt).
    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// The full stop-word set, with medical terms already removed.
    pub fn stop_words(&self) -> &HashSet<&'static str> {
        &self.stop_words
    }

    /// Colloquial-to-canonical synonym pairs.
    pub fn synonyms(&self) -> &[(&'static str, &'static str)] {
        &self.synonyms
    }

    /// Alternate phrasings for a canonical symptom, used by augmentation.
    pub fn variations_of(&self, symptom: &str) -> Option<&[&'static str]> {
        self.symptom_variations.get(symptom).map(|v| v.as_slice())
    }

    /// Representative symptoms per body system, used by augmentation.
    pub fn system_symptoms(&self) -> &[(&'static str, Vec<&'static str>)] {
        &self.system_symptoms
    }
}

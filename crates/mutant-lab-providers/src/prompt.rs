// crates/mutant-lab-providers/src/prompt.rs
// ============================================================================
// Module: Creature Prompt
// Description: Prompt text and response schema for creature generation.
// Purpose: Steer the text model toward schema-valid creature JSON.
// Dependencies: mutant-lab-core, serde_json
// ============================================================================

//! ## Overview
//! The prompt names the selected elements, the creature's gender and
//! archetype, and the output language. The response schema constrains the
//! model to the fields [`mutant_lab_core::CreatureDetails`] expects; field
//! descriptions are written in the display language so the model answers in
//! it. `imagePrompt` is always requested in English.

// ============================================================================
// SECTION: Imports
// ============================================================================

use mutant_lab_core::Gender;
use mutant_lab_core::Language;
use mutant_lab_core::SynthesisRequest;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Field Descriptions
// ============================================================================

/// English schema field descriptions.
const FIELD_DESCRIPTIONS_EN: &[(&str, &str)] = &[
    ("name", "An inventive name for the new creature, at most three words."),
    (
        "description",
        "Three or four sentences on the creature's origin, lore and purpose.",
    ),
    ("abilities", "Two to four signature abilities or powers."),
    ("weaknesses", "One to three critical weaknesses."),
    ("habitat", "A short description of the environment the creature prefers."),
    ("dangerLevel", "How dangerous the creature is, as an integer from 0 to 100."),
    ("simulatedHP", "Simulated health points for the creature, as an integer."),
    ("attackPattern", "A short description of how the creature usually attacks."),
    (
        "onHitEffect",
        "What happens to a target struck by the creature, such as paralysis or corrosion.",
    ),
];

/// Thai schema field descriptions.
const FIELD_DESCRIPTIONS_TH: &[(&str, &str)] = &[
    ("name", "ชื่อที่สร้างสรรค์สำหรับสิ่งมีชีวิตใหม่ ไม่เกินสามคำ"),
    ("description", "สามถึงสี่ประโยคเกี่ยวกับที่มา ตำนาน และจุดประสงค์ของสิ่งมีชีวิต"),
    ("abilities", "ความสามารถหรือพลังเด่นสองถึงสี่อย่าง"),
    ("weaknesses", "จุดอ่อนสำคัญหนึ่งถึงสามอย่าง"),
    ("habitat", "คำอธิบายสั้นๆ เกี่ยวกับสภาพแวดล้อมที่สิ่งมีชีวิตชอบ"),
    ("dangerLevel", "ระดับความอันตรายของสิ่งมีชีวิต เป็นจำนวนเต็ม 0 ถึง 100"),
    ("simulatedHP", "ค่าพลังชีวิตจำลองของสิ่งมีชีวิต เป็นจำนวนเต็ม"),
    ("attackPattern", "คำอธิบายสั้นๆ ว่าสิ่งมีชีวิตนี้โจมตีอย่างไร"),
    ("onHitEffect", "สิ่งที่เกิดกับเป้าหมายเมื่อถูกโจมตี เช่น อัมพาตหรือถูกกัดกร่อน"),
];

/// Fields whose text must be written in the display language.
const LOCALIZED_FIELDS: &[&str] = &[
    "name",
    "description",
    "abilities",
    "weaknesses",
    "habitat",
    "attackPattern",
    "onHitEffect",
];

/// Every field the response must contain.
pub const REQUIRED_FIELDS: &[&str] = &[
    "name",
    "description",
    "abilities",
    "weaknesses",
    "habitat",
    "dangerLevel",
    "simulatedHP",
    "attackPattern",
    "onHitEffect",
    "imagePrompt",
];

/// Returns the schema description for `field` in `language`, falling back to English.
fn field_description(field: &str, language: Language) -> &'static str {
    let table = match language {
        Language::En => FIELD_DESCRIPTIONS_EN,
        Language::Th => FIELD_DESCRIPTIONS_TH,
    };
    table
        .iter()
        .chain(FIELD_DESCRIPTIONS_EN)
        .find(|(name, _)| *name == field)
        .map_or("", |(_, description)| *description)
}

// ============================================================================
// SECTION: Prompt
// ============================================================================

/// Builds the text-model prompt for `request`.
#[must_use]
pub fn creature_prompt(request: &SynthesisRequest) -> String {
    let quoted: Vec<String> = LOCALIZED_FIELDS.iter().map(|field| format!("'{field}'")).collect();
    format!(
        "Combine the following elements: [{elements}]. Create a new {gender} creature of the \
         '{experiment}' type. The {fields} fields of the JSON output MUST be written in \
         {language}. The 'imagePrompt' field MUST always be written in English. 'dangerLevel' \
         and 'simulatedHP' MUST be integers. Respond with a single JSON object that follows the \
         provided schema exactly, with no text or formatting outside it.",
        elements = request.element_names.join(", "),
        gender = request.gender,
        experiment = request.experiment,
        fields = quoted.join(", "),
        language = request.language.english_name(),
    )
}

/// Builds the response schema sent with the text request.
#[must_use]
pub fn response_schema(language: Language, gender: Gender) -> Value {
    let text = |field: &str| json!({"type": "STRING", "description": field_description(field, language)});
    let list = |field: &str| {
        json!({
            "type": "ARRAY",
            "description": field_description(field, language),
            "items": {"type": "STRING"}
        })
    };
    let integer =
        |field: &str| json!({"type": "INTEGER", "description": field_description(field, language)});
    json!({
        "type": "OBJECT",
        "properties": {
            "name": text("name"),
            "description": text("description"),
            "abilities": list("abilities"),
            "weaknesses": list("weaknesses"),
            "habitat": text("habitat"),
            "dangerLevel": integer("dangerLevel"),
            "simulatedHP": integer("simulatedHP"),
            "attackPattern": text("attackPattern"),
            "onHitEffect": text("onHitEffect"),
            "imagePrompt": {"type": "STRING", "description": image_prompt_description(gender)}
        },
        "required": REQUIRED_FIELDS,
    })
}

/// Describes the English image prompt the text model must produce.
fn image_prompt_description(gender: Gender) -> String {
    format!(
        "A detailed, photorealistic prompt for an image generator, in English. Show the {gender} \
         creature inside a sterile, dimly lit laboratory containment cell or a habitat suited to \
         its nature. Describe texture, lighting, anatomy and posture in dramatic, unsettling \
         language with a cinematic horror mood."
    )
}

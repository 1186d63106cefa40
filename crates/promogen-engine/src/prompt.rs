//! Prompt builders.
//!
//! Pure functions: every instruction string the engine sends is assembled
//! here from templates, user inputs and configuration.

use promogen_models::{AspectRatio, Category, GenerationInputs, PromptTemplate, ScenarioFocus, ScenePrompt, SceneRole};

/// Joins the descriptions of the first and second model.
pub const MODEL_DESCRIPTION_SEPARATOR: &str = " and the second model: ";

/// Motion prompt used when a slot has no scenario text.
pub const DEFAULT_MOTION_PROMPT: &str = "Cinematic product shot, slow motion, high quality, 4k, photorealistic";

/// Build the image-generation prompt for one catalog slot.
pub fn build_generation_prompt(template: &PromptTemplate, category: Category, inputs: &GenerationInputs) -> String {
    let ratio = inputs.aspect_ratio;
    let concept = match inputs.product_description() {
        Some(description) => format!(
            "{}. Integrate the following mood and setting: \"{}\".",
            template.text, description
        ),
        None => format!("{}.", template.text),
    };

    format!(
        "You are an image-to-image expert producing highly detailed, realistic visuals for affiliate marketing.\n\
         \n\
         # CORE RULES\n\
         1. PRODUCT REPLICATION: The product MUST look 100% IDENTICAL to the product reference images. Treat them as ground truth for its shape, color, label and packaging.\n\
         2. PHOTO STYLE: Commercial, ultra-realistic, cinematic photography.\n\
         3. OUTPUT: Return only the image. Never return text.\n\
         4. If human faces appear in the product reference images, IGNORE them.\n\
         5. ASPECT RATIO: The output must be {ratio}. {ratio_instruction}\n\
         6. NO TEXT: Never overlay AI-generated text, captions, logos or watermarks.\n\
         \n\
         # IMAGE CONTEXT\n\
         - CONTENT TYPE: {title}\n\
         - OUTPUT RATIO: {ratio}\n\
         - MAIN CONCEPT: {concept}\n\
         \n\
         # SPECIFIC DETAILS\n\
         {subject}\n\
         \n\
         The background, mood and props must fit this context.",
        ratio = ratio,
        ratio_instruction = ratio_instruction(ratio),
        title = template.title,
        concept = concept,
        subject = subject_block(category, inputs),
    )
}

fn ratio_instruction(ratio: AspectRatio) -> &'static str {
    match ratio {
        AspectRatio::Portrait | AspectRatio::ClassicPortrait => "Compose vertically.",
        AspectRatio::Landscape | AspectRatio::ClassicLandscape => "Compose horizontally.",
        AspectRatio::Square => "Compose for a square frame.",
    }
}

fn subject_block(category: Category, inputs: &GenerationInputs) -> String {
    if !(category.requires_human_subject() && inputs.has_model_images()) {
        return "IMPORTANT: No human model in this image. Focus only on the product.".to_string();
    }

    let mut block = String::from(
        "IMPORTANT FOR THE MODEL: Replicate the model from the model reference photos and show them together with the product. \
         The model's face MUST be identical to the uploaded model photos. \
         Do NOT copy any face that may appear in the product photos.",
    );

    let descriptions = inputs.model_descriptions();
    if !descriptions.is_empty() {
        block.push_str(&format!(
            "\nAdditional notes for the model: {}.",
            descriptions.join(MODEL_DESCRIPTION_SEPARATOR)
        ));
    }
    block
}

/// Camera-angle edit of an existing slot image.
pub fn build_edit_prompt(angle: &str) -> String {
    format!(
        "EDIT THIS IMAGE.\n\
         Change the camera angle to: \"{}\".\n\
         Do NOT change the subject or the product. Keep the original style.",
        angle.trim()
    )
}

/// Short video scenario (mood, camera, dialogue) for a slot image.
pub fn build_scenario_prompt(
    category: Category,
    focus: Option<ScenarioFocus>,
    product_description: Option<&str>,
    language: &str,
) -> String {
    let focus_line = match (category.requires_human_subject(), focus) {
        (true, Some(focus)) => format!("SPECIAL MODE: {}. {}\n", focus.as_str(), focus.instruction()),
        _ => String::new(),
    };

    format!(
        "You are a copywriter. Write a short video prompt (scenario) based on THIS IMAGE.\n\
         Product: {product}\n\
         Dialogue language: {language}\n\
         \n\
         Task: Write a short video scenario (5-10 seconds) with CREATIVE DIALOGUE.\n\
         {focus_line}\
         \n\
         Output format:\n\
         **Mood:** ...\n\
         **Camera style:** ...\n\
         **Dialogue ({language}):** ...",
        product = product_description.unwrap_or("the product in the image"),
        language = language,
        focus_line = focus_line,
    )
}

/// One-paragraph text-to-image description that recreates an image.
pub fn build_cinematic_prompt() -> String {
    "Analyze this image and write a highly detailed, cinematic 'text-to-image' prompt in English to recreate it. \
     Focus on subject, lighting, atmosphere, and composition. One paragraph only."
        .to_string()
}

/// Request for a scene's script and visual prompt.
pub fn build_scene_prompt_request(language: &str) -> String {
    format!(
        "Analyze this image.\n\
         1. Create a short script/dialogue (max 1 sentence) strictly in {language}.\n\
         2. Create a high-quality, cinematic English visual prompt for Veo (max 50 words).\n\
         \n\
         Output format:\n\
         Script: [Script in {language}]\n\
         \n\
         Visual Prompt (Veo): [English Visual Prompt]",
        language = language
    )
}

/// Four-beat story plan request, answered as a JSON array.
pub fn build_story_plan_prompt(language: &str) -> String {
    let beat = |role: SceneRole, hint: &str| {
        format!(
            "    {{ \"type\": \"{}\", \"script_id\": \"Script text in {}\", \"visual_en\": \"{}\" }}",
            role, language, hint
        )
    };
    let beats = [
        beat(
            SceneRole::Hook,
            "Detailed English visual prompt for Veo, describing the scene based on the reference image action.",
        ),
        beat(
            SceneRole::Problem,
            "Detailed English visual prompt. Character looks concerned or shows the problem. SAME CHARACTER FACE/CLOTHES as reference.",
        ),
        beat(
            SceneRole::Solution,
            "Detailed English visual prompt. Character happy, holding product, glowing. SAME CHARACTER FACE/CLOTHES as reference.",
        ),
        beat(
            SceneRole::Cta,
            "Detailed English visual prompt. Character showing product to camera, inviting. SAME CHARACTER FACE/CLOTHES as reference.",
        ),
    ];

    format!(
        "Analyze this image (Scene 1). This is the \"Hook\".\n\
         Create a 4-scene video promotion strategy for this product/person.\n\
         \n\
         IMPORTANT: Write the \"script_id\" (dialogue/voiceover) strictly in {language}.\n\
         \n\
         Structure:\n\
         1. HOOK: Catchy opening.\n\
         2. PROBLEM: The pain point.\n\
         3. SOLUTION: The product details.\n\
         4. CTA: Call to action.\n\
         \n\
         Output JSON format ONLY, exactly 4 entries in this order:\n\
         [\n{beats}\n]",
        language = language,
        beats = beats.join(",\n"),
    )
}

/// Image prompt for a story beat anchored on the seed image.
pub fn build_consistency_prompt(role: SceneRole, visual: &str) -> String {
    format!(
        "Create a photorealistic image based on the reference image (Scene 1).\n\
         MANDATORY: The character's face, hair, clothing, and general style MUST BE IDENTICAL to the reference image.\n\
         \n\
         SCENE CONTEXT ({role}):\n\
         {visual}\n\
         \n\
         Make sure the lighting and quality match the reference. Cinematic 8K.",
        role = role,
        visual = visual.trim(),
    )
}

/// Final video prompt for a scene.
///
/// A composite prompt with a script becomes the visual description plus a
/// speaking instruction; anything else is used as the visual description.
pub fn compose_video_prompt(prompt: &ScenePrompt, language: &str) -> String {
    match prompt.script() {
        Some(script) if !script.is_empty() => format!(
            "{} \n\nIMPORTANT: The character is speaking in {}. Dialogue: \"{}\".",
            prompt.visual(),
            language,
            script
        ),
        _ => prompt.visual().to_string(),
    }
}

/// Motion prompt for a slot video.
pub fn slot_motion_prompt(scenario: Option<&str>) -> String {
    match scenario.map(str::trim).filter(|s| !s.is_empty()) {
        Some(scenario) => format!("{}. Cinematic, high resolution.", scenario),
        None => DEFAULT_MOTION_PROMPT.to_string(),
    }
}

//! Prompt construction for each prediction type
//!
//! The prompts carry three contracts the validator later enforces: the
//! tab-separated output format, the per-type field list, and the target
//! language for field values. Pre-calculated astrology facts are injected
//! from the subject profile so the model personalizes instead of counting
//! stems and branches itself.

use chrono::{Datelike, Local, NaiveDate};

use crate::profile::SubjectProfile;
use lumen_probe_core::quality::Language;
use lumen_probe_core::schema::PredictionType;

#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Build the system and user prompt for one request
pub fn build(kind: PredictionType, language: Language, subject: &SubjectProfile) -> Prompt {
    match kind {
        PredictionType::Daily => daily(language, subject),
        PredictionType::Yearly => yearly(language, subject),
        PredictionType::Lifetime => lifetime(language, subject),
    }
}

fn system_prompt(role: &str, language: Language) -> String {
    format!(
        "{role}\n\n\
         ===== CRITICAL LANGUAGE REQUIREMENT =====\n\
         Write all FIELD VALUES in {name} ONLY.\n\
         Field names remain in English.\n\
         DO NOT mix languages in field values.\n\
         ============================================\n\n\
         IMPORTANT: All content is for entertainment and self-reflection purposes only.",
        name = language.display_name()
    )
}

fn language_instruction(language: Language) -> String {
    match language {
        Language::SimplifiedChinese => "===== 语言要求 =====\n\
            必须用简体中文书写所有字段的值（value）。\n\
            字段名（field name）保持英文不变。\n\
            示例：\n  dayTitle\t反思与和谐之日     ← 值用简体中文\n  card_name\t月亮                ← 值用简体中文\n\
            重要提醒：OUTPUT STRUCTURE中的英文示例仅为结构说明，必须将模板文本也翻译成简体中文。\n\
            ===================\n"
            .to_string(),
        Language::TraditionalChinese => "===== 語言要求 =====\n\
            必須用繁體中文書寫所有字段的值（value）。\n\
            字段名（field name）保持英文不變。\n\
            示例：\n  dayTitle\t反思與和諧之日     ← 值用繁體中文\n  card_name\t月亮                ← 值用繁體中文\n\
            ===================\n"
            .to_string(),
        Language::Spanish => "===== REQUISITO DE IDIOMA =====\n\
            Escribe todos los valores de campo en ESPAÑOL.\n\
            Los nombres de campo permanecen en inglés.\n\
            Ejemplo:\n  dayTitle\tEl Día de Reflexión  ← valor en español\n\
            ================================\n"
            .to_string(),
        Language::English => "===== LANGUAGE REQUIREMENT =====\n\
            Write all field VALUES in English.\n\
            Field names remain in English.\n\
            Example:\n  dayTitle\tThe Day of Reflection  ← value in English\n\
            ================================\n"
            .to_string(),
    }
}

const EXCEPTIONS_AND_FORMAT: &str = "\n\
    EXCEPTIONS:\n\
    - User names: Keep unchanged (don't translate)\n\
    - Chinese stems/branches (天干地支): Can include Chinese and pinyin like \"甲子 (Jiǎzǐ)\"\n\n\
    FORMAT REQUIREMENT:\n\
    - Return raw TSV (Tab-Separated Values)\n\
    - Use ACTUAL TAB CHARACTER (\\t) between field name and value\n\
    - Arrays: item1|item2|item3 (pipe separator)\n\
    - NO JSON, NO markdown, NO extra text\n\
    - Start immediately with the data\n\n";

fn daily(language: Language, subject: &SubjectProfile) -> Prompt {
    let system = system_prompt(
        "You are a professional astrology consultant providing personalized insights.",
        language,
    );
    let today = Local::now().format("%Y-%m-%d");
    let element = subject.zodiac_element();

    let mut user = language_instruction(language);
    user.push_str(EXCEPTIONS_AND_FORMAT);
    user.push_str(&format!(
        "Create personalized daily insights for {today}.\nUser: {}\n\n",
        subject.summary()
    ));
    user.push_str(&format!(
        "========== PRE-CALCULATED VALUES (Use for personalization) ==========\n\
         Display Name: {first} (Use this in greetings and personalized messages. NEVER translate this name.)\n\
         Sun Sign: {sun}\n\
         Zodiac Element: {element}\n\
         Birth Year Zodiac: {zodiac}\n\
         Chinese Element: {chinese}\n\n",
        first = subject.first_name,
        sun = subject.sun_sign,
        zodiac = subject.birth_year_zodiac,
        chinese = subject.birth_year_element,
    ));
    user.push_str(&daily_structure(subject, element));
    user.push_str(DAILY_RULES);
    Prompt { system, user }
}

fn daily_structure(subject: &SubjectProfile, element: &str) -> String {
    format!(
        "OUTPUT STRUCTURE (26 fields organized in 4 sections):\n\n\
         === 1. DAY THEME ===\n\
         dayTitle\tThe Day of [word1] and [word2]\n\n\
         === 2. TODAY'S READING ===\n\
         card_name\tCard name (VARIED for {sun}/{element}/today's energy)\n\
         card_essence\t1-2 words, comma-separated if two\n\
         card_orient\tUpright or Reversed\n\
         path_title\t{first}'s Path Today - A [adjective] Path\n\
         path_intro\t15-25 words starting 'Hi {first}'\n\
         path_detail\t30-40 words of wisdom\n\
         career\t10-20 words advice\n\
         love\t10-20 words advice\n\
         prosperity\t10-20 words advice\n\
         wellness\t10-15 words advice\n\
         takeaway\t15-25 words '{first}, your...'\n\n\
         === 3. LUCKY ALIGNMENTS ===\n\
         lucky_num\tWord (digit) e.g. Eight (8)\n\
         lucky_digit\t1-9\n\
         num_meaning\t15-20 words for THIS user\n\
         num_calc\t12-18 words showing actual formula\n\
         stone\tStone for {element} element\n\
         stone_power\t15-20 words how it helps\n\
         stone_use\t15-20 words 'Meditate:' or 'Practice:'\n\
         spell\t2 words poetic\n\
         spell_words\t20-30 words affirmation in quotes\n\
         spell_intent\t10-12 words 'To [verb]...'\n\n\
         === 4. TWIST OF FORTUNE ===\n\
         fortune_title\t4-8 words poetic metaphor\n\
         fortune_do\tactivity1|activity2|activity3|activity4|activity5\n\
         fortune_avoid\tactivity1|activity2|activity3|activity4|activity5\n\
         fortune_tip\t10-15 words 'Today's turning point...'\n\n",
        sun = subject.sun_sign,
        first = subject.first_name,
    )
}

const DAILY_RULES: &str = "CONTENT REQUIREMENTS:\n\
    - Each line: exactly ONE TAB CHARACTER (\\t) between field and value\n\
    - Array values: EXACTLY 5 items for each array, each item 2-3 words\n\
    - No line breaks within field values\n\
    - Lucky Stone by element: Fire→Carnelian/Ruby/Garnet, Earth→Jade/Emerald/Moss Agate, Air→Citrine/Aquamarine, Water→Moonstone/Pearl/Lapis Lazuli\n\
    - Lucky Number: Generate VARIED numbers (1-9), ensure variety across users\n\
    - Use 'You/Your' extensively, warm tone, no special chars/emoji/line breaks\n";

fn yearly(language: Language, subject: &SubjectProfile) -> Prompt {
    let system = system_prompt(
        "You are a professional astrology and divination expert.",
        language,
    );
    let current_year = Local::now().year();

    let mut user = language_instruction(language);
    user.push_str(EXCEPTIONS_AND_FORMAT);
    user.push_str(&format!(
        "Generate yearly prediction for {current_year}.\nUser: {}\n\n",
        subject.summary()
    ));
    user.push_str(&format!(
        "========== PRE-CALCULATED VALUES (Use these EXACT values, do NOT recalculate) ==========\n\
         Sun Sign: {sun}\n\
         Birth Year Zodiac: {zodiac}\n\
         Yearly Year ({current_year}): {year_zodiac}\n\
         Taishui Relationship: {taishui}\n\n",
        sun = subject.sun_sign,
        zodiac = subject.birth_year_zodiac,
        year_zodiac = sexagenary(current_year),
        taishui = taishui(birth_year(subject), current_year),
    ));
    user.push_str(&format!(
        "FORMAT (TSV - Tab-Separated Values):\n\
         Each field on ONE line: fieldName\tvalue\n\n\
         Output format (use TAB between field and value):\n\
         astro_overlay\t{sun} Sun · Warrior Archetype — {current_year} [Key planetary transits]\n\
         theme_title\t[VARIED: 4-7 words using 'of' structure]\n\
         theme_glance\t[VARIED: 15-20 words on what both systems agree]\n\
         theme_detail\t[VARIED: 60-80 words in 3 parts]\n",
        sun = subject.sun_sign,
    ));
    for area in ["career", "love", "prosperity", "wellness"] {
        user.push_str(&format!(
            "{area}_score\t[1-5 based on analysis]\n\
             {area}_tag\t[10-15 words]\n\
             {area}_do\titem1|item2\n\
             {area}_avoid\titem1|item2\n\
             {area}_detail\t[50-70 words in 3 parts: formula, feeling, meaning]\n"
        ));
    }
    user.push_str(
        "mantra\t[18-25 words using first-person 'My' declarations]\n\n\
         CRITICAL FORMAT REQUIREMENTS:\n\
         - Each line: exactly ONE TAB CHARACTER (\\t) between field name and value\n\
         - Array values: use | separator, NO tabs within arrays\n\
         - Scores: integer 1-5 only (1=challenging, 2=mixed, 3=favorable, 4=excellent, 5=outstanding)\n\
         - No line breaks within field values\n\
         - Career tagline starts 'Your superpower this year:', others philosophical\n\
         - Avoid fields: 3-6 specific nouns, use double space not line breaks\n",
    );
    Prompt { system, user }
}

fn lifetime(language: Language, subject: &SubjectProfile) -> Prompt {
    let system = system_prompt(
        "You are a professional astrology and divination expert.",
        language,
    );
    let current_year = Local::now().year();
    let born = birth_year(subject);

    let mut user = language_instruction(language);
    user.push_str(EXCEPTIONS_AND_FORMAT);
    user.push_str(&format!(
        "Generate lifetime profile for user.\nUser: {}\nCurrent Year: {current_year}\n\n",
        subject.summary()
    ));
    user.push_str(&format!(
        "========== PRE-CALCULATED VALUES (Use EXACT values, do NOT recalculate) ==========\n\
         Sun Sign: {sun} | Moon Sign: {moon} | Rising Sign: {rising}\n\
         Birth Year Zodiac: {zodiac} | Birth Year Animal: {animal} | Birth Year Element: {element}\n\
         Current Year ({current_year}): {year_zodiac}\n\
         {cycles}\n\
         IMPORTANT: All Chinese Zodiac content must reference USER'S Birth Year Zodiac ({zodiac}), NOT the current year.\n\n",
        sun = subject.sun_sign,
        moon = subject.moon_sign,
        rising = subject.rising_sign,
        zodiac = subject.birth_year_zodiac,
        animal = subject.birth_year_animal,
        element = subject.birth_year_element,
        year_zodiac = sexagenary(current_year),
        cycles = cycles(born, subject.current_age),
    ));
    user.push_str(&format!(
        "FORMAT (TSV - Tab-Separated Values):\n\
         Each field on ONE line: fieldName\tvalue\n\n\
         Output format (TAB shown between field and value):\n\
         pillars_id\t[12-18 words addressing by name]\n\
         pillars_detail\t[45-60 words using {sun}, 'both...yet' patterns]\n\
         cn_year\t[CRITICAL: match target language - en='Year of the {animal}', zh='马年' style]\n\
         sun_tag\tYou [2-5 words poetic metaphor]\n\
         sun_arch\tSun in {sun} - The [3-5 words archetype]\n\
         sun_desc\t[18-25 words core traits using 'You']\n\
         moon_sign\t{moon}\n\n\
         CRITICAL FORMAT REQUIREMENTS:\n\
         - Each line: exactly ONE TAB CHARACTER (\\t) between field name and value\n\
         - No line breaks within field values\n\
         - Return ONLY TSV format, no markdown, no extra text\n\n\
         RULES:\n\
         - Use 'both...yet' contrasts, 'You are here to...', 'Your power grows when...' patterns\n\
         - Use 'You/Your' extensively, warm tone, no special chars/emoji/line breaks\n",
        sun = subject.sun_sign,
        moon = subject.moon_sign,
        animal = subject.birth_year_animal,
    ));
    Prompt { system, user }
}

fn birth_year(subject: &SubjectProfile) -> i32 {
    NaiveDate::parse_from_str(&subject.birth_date, "%Y-%m-%d")
        .map(|d| d.year())
        .unwrap_or_else(|_| Local::now().year() - subject.current_age as i32)
}

const STEMS: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];
const STEM_ELEMENTS: [&str; 10] = [
    "Wood", "Wood", "Fire", "Fire", "Earth", "Earth", "Metal", "Metal", "Water", "Water",
];
const BRANCHES: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];
const BRANCH_ANIMALS: [&str; 12] = [
    "Rat", "Ox", "Tiger", "Rabbit", "Dragon", "Snake", "Horse", "Goat", "Monkey", "Rooster",
    "Dog", "Pig",
];

/// Sexagenary-cycle label for a Gregorian year, e.g. "Wood Snake (乙巳)"
fn sexagenary(year: i32) -> String {
    let stem = (year - 4).rem_euclid(10) as usize;
    let branch = (year - 4).rem_euclid(12) as usize;
    format!(
        "{} {} ({}{})",
        STEM_ELEMENTS[stem], BRANCH_ANIMALS[branch], STEMS[stem], BRANCHES[branch]
    )
}

/// Relationship between the birth-year branch and the current-year branch
fn taishui(birth_year: i32, current_year: i32) -> &'static str {
    let birth = (birth_year - 4).rem_euclid(12);
    let current = (current_year - 4).rem_euclid(12);
    if birth == current {
        "Matching (值太岁)"
    } else if (birth - current).rem_euclid(12) == 6 {
        "Clashing (冲太岁)"
    } else {
        "Neutral"
    }
}

/// Three decade-cycle lines around the subject's current age
fn cycles(birth_year: i32, age: u32) -> String {
    let decade = (age / 10) * 10;
    let mut lines = String::new();
    for (label, start) in [
        ("Past Cycle", decade.saturating_sub(10)),
        ("Current Cycle", decade),
        ("Future Cycle", decade + 10),
    ] {
        let from = birth_year + start as i32;
        lines.push_str(&format!(
            "{label}: {start}-{end} · {from}-{to}\n",
            end = start + 9,
            to = from + 9,
        ));
    }
    lines
}

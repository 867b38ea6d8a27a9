//! Справочник голосов и эмоций для режима CustomVoice

/// Предустановленные голоса по языкам
pub const SPEAKERS: &[(&str, &[&str])] = &[
    ("English", &["Ryan", "Aiden", "Ethan", "Chelsie", "Serena", "Vivian"]),
    ("Chinese", &["Vivian", "Serena", "Uncle_Fu", "Dylan", "Eric"]),
    ("Japanese", &["Ono_Anna"]),
    ("Korean", &["Sohee"]),
];

/// Эмоции, передаваемые как инструкция
pub const EMOTIONS: &[&str] = &["Normal tone", "Sad", "Excited", "Angry", "Whispering"];

pub const DEFAULT_EMOTION: &str = "Normal tone";

pub const DEFAULT_LANGUAGE: &str = "Chinese";

/// Список языков в порядке отображения
pub fn languages() -> impl Iterator<Item = &'static str> {
    SPEAKERS.iter().map(|(language, _)| *language)
}

/// Голоса для языка; пустой список для неизвестного языка
pub fn speakers_for(language: &str) -> &'static [&'static str] {
    SPEAKERS
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, speakers)| *speakers)
        .unwrap_or(&[])
}

/// Голос, выбираемый при переключении языка
pub fn default_speaker_for(language: &str) -> Option<&'static str> {
    speakers_for(language).first().copied()
}

/// Проверить, что голос есть в справочнике (без учета регистра)
pub fn is_known_speaker(speaker: &str) -> bool {
    SPEAKERS
        .iter()
        .flat_map(|(_, speakers)| speakers.iter())
        .any(|known| known.eq_ignore_ascii_case(speaker))
}

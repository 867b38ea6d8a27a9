use crate::catalog;
use crate::mode::Mode;

#[test]
fn test_languages_in_display_order() {
    let languages: Vec<&str> = catalog::languages().collect();
    assert_eq!(languages, vec!["English", "Chinese", "Japanese", "Korean"]);
}

#[test]
fn test_speakers_for_language() {
    assert_eq!(catalog::speakers_for("Japanese"), &["Ono_Anna"]);
    assert!(catalog::speakers_for("Klingon").is_empty());
    assert_eq!(catalog::default_speaker_for(catalog::DEFAULT_LANGUAGE), Some("Vivian"));
    assert_eq!(catalog::default_speaker_for("Klingon"), None);
}

#[test]
fn test_known_speaker_ignores_case() {
    assert!(catalog::is_known_speaker("vivian"));
    assert!(catalog::is_known_speaker("UNCLE_FU"));
    assert!(!catalog::is_known_speaker("narrator"));
}

#[test]
fn test_default_emotion_listed() {
    assert!(catalog::EMOTIONS.contains(&catalog::DEFAULT_EMOTION));
}

#[test]
fn test_mode_keys_and_labels() {
    for mode in Mode::ALL {
        assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        assert_eq!(Mode::from_label(mode.label()).unwrap(), mode);
    }
    assert_eq!(Mode::Clone.label(), "零样本克隆");
    assert!("Pro-Unknown".parse::<Mode>().is_err());
}

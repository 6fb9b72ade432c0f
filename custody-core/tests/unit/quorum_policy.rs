use custody_core::application::CoordinatorSettings;
use custody_core::domain::QuorumPolicy;
use custody_core::foundation::ErrorCode;

#[test]
fn generate_policy_accepts_two_matching_answers() {
    let policy = QuorumPolicy::new(2).expect("policy");
    assert_eq!(policy.agree(&["0xA".to_string(), "0xA".to_string()]).expect("agree"), "0xA");
    assert_eq!(policy.agree(&["0xA".to_string(), "0xA".to_string(), "0xA".to_string()]).expect("agree"), "0xA");
}

#[test]
fn generate_policy_rejects_single_answer_and_dissent() {
    let policy = QuorumPolicy::new(2).expect("policy");
    assert_eq!(policy.agree(&["0xA".to_string()]).expect_err("one answer").code(), ErrorCode::ConsensusFailed);
    let split = ["0xA".to_string(), "0xA".to_string(), "0xB".to_string()];
    assert_eq!(policy.agree(&split).expect_err("dissent").code(), ErrorCode::ConsensusFailed);
    assert_eq!(policy.agree::<String>(&[]).expect_err("none").code(), ErrorCode::ConsensusFailed);
}

#[test]
fn sign_policy_is_strict() {
    let policy = QuorumPolicy::strict();
    assert!(policy.is_strict());
    assert!(policy.ensure_met(3).is_ok());
    assert_eq!(policy.ensure_met(2).expect_err("two of three").code(), ErrorCode::ConsensusFailed);
}

#[test]
fn default_settings_keep_generate_and_sign_apart() {
    let settings = CoordinatorSettings::default();
    assert_eq!(settings.generate.required(), 2);
    assert_eq!(settings.sign.required(), 3);
}

#[test]
fn quorum_bounds_are_enforced() {
    assert_eq!(QuorumPolicy::new(0).expect_err("zero").code(), ErrorCode::ConfigError);
    assert_eq!(QuorumPolicy::new(4).expect_err("four").code(), ErrorCode::ConfigError);
}

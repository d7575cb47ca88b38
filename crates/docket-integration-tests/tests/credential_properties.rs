//! Properties of stored credentials as seen by callers.

use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use docket_crypto::{CredentialBlob, hash_password, verify_password};

/// `correct-password` under salt bytes 0..16, derived independently.
const KNOWN_CREDENTIAL: &str =
    "AAECAwQFBgcICQoLDA0ODw==:CCqtNmh9f5LK2RCUASXI2tmbGc6Zp4ktnz4bf9pAfuQ=";

/// The empty password under sixteen 0xff salt bytes, derived independently.
const KNOWN_EMPTY_CREDENTIAL: &str =
    "/////////////////////w==:RZhFT7P2ptY79lztIabZ7N8oa1jHmZgFqhG46n5BQb0=";

#[test]
fn correct_password_verifies_and_wrong_one_does_not() {
    let stored = hash_password("correct-password").unwrap();
    assert!(verify_password("correct-password", &stored));
    assert!(!verify_password("wrong-password", &stored));
}

#[test]
fn stored_format_is_two_base64_halves() {
    let stored = hash_password("hunter2").unwrap();
    let re = regex::Regex::new(r"^[A-Za-z0-9+/=]+:[A-Za-z0-9+/=]+$").unwrap();
    assert!(re.is_match(&stored));

    let (salt, key) = stored.split_once(':').unwrap();
    assert_eq!(STANDARD.decode(salt).unwrap().len(), 16);
    assert_eq!(STANDARD.decode(key).unwrap().len(), 32);
}

#[test]
fn existing_credentials_keep_verifying() {
    assert!(verify_password("correct-password", KNOWN_CREDENTIAL));
    assert!(!verify_password("Correct-password", KNOWN_CREDENTIAL));
    assert!(verify_password("", KNOWN_EMPTY_CREDENTIAL));
    assert!(!verify_password(" ", KNOWN_EMPTY_CREDENTIAL));
}

#[test]
fn surrounding_whitespace_in_storage_is_tolerated() {
    let padded = format!("  {KNOWN_CREDENTIAL}\n");
    assert!(verify_password("correct-password", &padded));
}

#[test]
fn hashing_twice_gives_distinct_blobs() {
    let a = hash_password("same-password").unwrap();
    let b = hash_password("same-password").unwrap();
    assert_ne!(a, b);

    let salt_a = CredentialBlob::parse(&a).unwrap();
    let salt_b = CredentialBlob::parse(&b).unwrap();
    assert_ne!(salt_a.salt(), salt_b.salt());
    assert!(verify_password("same-password", &a));
    assert!(verify_password("same-password", &b));
}

#[test]
fn malformed_blobs_never_verify() {
    let salt = STANDARD.encode([3u8; 16]);
    let key = STANDARD.encode([4u8; 32]);
    let blobs = [
        String::new(),
        "not-a-valid-blob".to_owned(),
        key.clone(),
        format!("{salt}:{key}:{key}"),
        format!("{salt}::{key}"),
        format!("{salt}:not*base64"),
        format!("not*base64:{key}"),
        format!("{}:{key}", STANDARD.encode([3u8; 15])),
        format!("{salt}:{}", STANDARD.encode([4u8; 33])),
        "\u{0}:\u{0}".to_owned(),
    ];

    for blob in &blobs {
        let outcome = std::panic::catch_unwind(|| verify_password("hunter2", blob));
        assert_eq!(outcome.ok(), Some(false), "blob {blob:?}");
    }
    assert!(!verify_password("hunter2", "not-a-valid-blob"));
}

#[test]
fn verification_works_across_threads() {
    let stored = hash_password("shared").unwrap();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let stored = stored.clone();
            std::thread::spawn(move || {
                let guess = if i % 2 == 0 { "shared" } else { "other" };
                (i, verify_password(guess, &stored))
            })
        })
        .collect();

    for handle in handles {
        let (i, ok) = handle.join().unwrap();
        assert_eq!(ok, i % 2 == 0);
    }
}

fn median_verify_time(password: &str, stored: &str, rounds: usize) -> Duration {
    let mut samples: Vec<Duration> = (0..rounds)
        .map(|_| {
            let start = Instant::now();
            std::hint::black_box(verify_password(password, stored));
            start.elapsed()
        })
        .collect();
    samples.sort();
    samples[rounds / 2]
}

/// Every verification outcome costs one key derivation.
///
/// Sensitive to machine load, so it only runs on request.
#[test]
#[ignore = "timing-sensitive; run with --ignored on a quiet machine"]
fn verification_time_does_not_depend_on_outcome() {
    let stored = hash_password("correct-password").unwrap();
    let rounds = 31;

    let correct = median_verify_time("correct-password", &stored, rounds);
    let wrong = median_verify_time("wrong-password!!", &stored, rounds);
    let malformed = median_verify_time("correct-password", "not-a-valid-blob", rounds);

    let ratio = |a: Duration, b: Duration| a.as_secs_f64() / b.as_secs_f64();
    for (label, r) in [
        ("wrong/correct", ratio(wrong, correct)),
        ("malformed/correct", ratio(malformed, correct)),
    ] {
        assert!(
            (0.8..1.25).contains(&r),
            "{label} ratio {r:.3} (correct {correct:?}, wrong {wrong:?}, malformed {malformed:?})"
        );
    }
}

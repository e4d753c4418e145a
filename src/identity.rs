use bitrank_core::splitmix32;

#[cfg(target_arch = "wasm32")]
use crate::persisted::USER_ID_KEY;

const SUFFIX_LEN: usize = 9;
const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Anonymous reporting id, `user_<ms>_<9 base36 chars>`. Created once and
/// kept in local storage; native callers get a fresh id per process.
pub fn user_id() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(existing) = crate::store::read_raw(USER_ID_KEY) {
            return existing;
        }
        let id = generate_user_id();
        crate::store::write_raw(USER_ID_KEY, &id);
        return id;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        generate_user_id()
    }
}

fn generate_user_id() -> String {
    let now = now_ms();
    let mut suffix = String::with_capacity(SUFFIX_LEN);
    let mut word = random_word(now);
    for _ in 0..SUFFIX_LEN {
        word = splitmix32(word);
        suffix.push(BASE36_ALPHABET[(word % 36) as usize] as char);
    }
    format!("user_{now}_{suffix}")
}

fn random_word(now: u64) -> u32 {
    #[cfg(target_arch = "wasm32")]
    {
        let noise = (js_sys::Math::random() * u32::MAX as f64) as u32;
        return noise ^ now as u32;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|duration| duration.subsec_nanos())
            .unwrap_or(0);
        return nanos ^ now as u32;
    }
}

fn now_ms() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        return js_sys::Date::now() as u64;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        return std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|duration| duration.as_millis() as u64)
            .unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_the_expected_shape() {
        let id = generate_user_id();
        let mut parts = id.splitn(3, '_');
        assert_eq!(parts.next(), Some("user"));
        let millis = parts.next().expect("timestamp part");
        assert!(millis.chars().all(|ch| ch.is_ascii_digit()));
        let suffix = parts.next().expect("suffix part");
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit()));
    }
}

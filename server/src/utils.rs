use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Get current timestamp in milliseconds
pub fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

// Deterministic per-session color used by clients for rendering
pub fn player_color(session_id: u32) -> String {
    let colors = ["blue", "red", "green", "purple", "orange", "cyan", "magenta", "yellow"];
    colors[session_id as usize % colors.len()].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_deterministic_and_cycling() {
        assert_eq!(player_color(1), player_color(1));
        assert_eq!(player_color(2), player_color(10));
        assert_ne!(player_color(1), player_color(2));
    }

    #[test]
    fn test_timestamp_monotonic_enough() {
        let a = get_timestamp();
        let b = get_timestamp();
        assert!(b >= a);
    }
}

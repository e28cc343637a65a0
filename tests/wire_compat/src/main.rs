fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and
    /// compares the JSON values (order-independent comparison).
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  API:  {fixture}\n  Rust: {reserialized}"
        );
    }

    // --- Upload endpoint ---

    #[test]
    fn fixture_upload_accepted() {
        roundtrip_test::<receiptscan_protocol::UploadAccepted>("upload_accepted.json");
    }

    #[test]
    fn fixture_upload_rejected() {
        roundtrip_test::<receiptscan_protocol::ErrorBody>("upload_rejected.json");
    }

    // --- Status endpoint ---

    #[test]
    fn fixture_status_processing() {
        roundtrip_test::<receiptscan_protocol::StatusBody>("status_processing.json");
    }

    #[test]
    fn fixture_status_completed() {
        roundtrip_test::<receiptscan_protocol::CompletedBody>("status_completed.json");
    }

    #[test]
    fn fixture_status_failed() {
        roundtrip_test::<receiptscan_protocol::ErrorBody>("status_failed.json");
    }

    #[test]
    fn completed_fixture_parsed_payload_survives() {
        let fixture = load_fixture("status_completed.json");
        let body: receiptscan_protocol::CompletedBody =
            serde_json::from_value(fixture.clone()).unwrap();

        // The parsed invoice is opaque to the client; every field of
        // the fixture must survive untouched.
        assert_eq!(body.parsed, fixture["parsed"]);
        assert_eq!(body.parsed["merchant"]["name"], "Acme Markt");
        assert_eq!(body.parsed["totals"]["gross"], 12.5);
    }
}

use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TexOpError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        TexOpError::negotiation("x")
            .to_string()
            .contains("negotiation error:")
    );
    assert!(TexOpError::setup("x").to_string().contains("setup error:"));
    assert!(
        TexOpError::disabled("x")
            .to_string()
            .contains("node disabled:")
    );
    assert!(
        TexOpError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TexOpError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#![no_main]

use formkit_rules::{FieldValue, derive_rules};
use formkit_schema::FormDocument;
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes must never panic the importer or the deriver, and an
// accepted document must survive an export/import cycle.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(document) = FormDocument::from_json(text) else {
        return;
    };

    for field in document.all_fields() {
        if let Ok(rules) = derive_rules(field) {
            let _ = rules.check(&FieldValue::text(text));
            let _ = rules.check(&FieldValue::checked([text]));
        }
    }

    let json = document.to_json_pretty().expect("accepted document encodes");
    let again = FormDocument::from_json(&json).expect("exported document re-imports");
    assert_eq!(again, document);
});

//! Structural schema checks over a raw manifest
//!
//! The validator must keep running against best-effort data even when the
//! manifest is malformed, so these checks operate on `serde_json::Value`
//! rather than on the typed descriptor. [`SectionView`] extracts whatever
//! sections are well-formed for the later checks.

use serde_json::Value;

/// Best-effort view of the checkable sections of a manifest.
#[derive(Debug, Default)]
pub(crate) struct SectionView {
    pub moc: Option<String>,
    pub textures: Vec<String>,
    pub physics: Option<String>,
    pub pose: Option<String>,
    /// Group name -> entry `File` values (`None` = entry missing its `File`).
    pub motions: Vec<(String, Vec<Option<String>>)>,
    /// Expression `File` values (`None` = entry missing its `File`).
    pub expressions: Vec<Option<String>>,
    /// `(target, ids)` per group declaration.
    pub groups: Vec<(String, Vec<String>)>,
}

/// Run structural checks, appending a human-readable error per violation.
pub(crate) fn check(manifest: &Value, errors: &mut Vec<String>) {
    let Some(root) = manifest.as_object() else {
        errors.push("schema violation: manifest is not an object".to_string());
        return;
    };

    match root.get("Version") {
        Some(v) if v.is_number() => {}
        Some(_) => errors.push("schema violation: Version is not a number".to_string()),
        None => errors.push("schema violation: missing Version".to_string()),
    }

    let Some(refs) = root.get("FileReferences") else {
        errors.push("schema violation: missing FileReferences".to_string());
        return;
    };
    let Some(refs) = refs.as_object() else {
        errors.push("schema violation: FileReferences is not an object".to_string());
        return;
    };

    match refs.get("Moc") {
        Some(v) if v.is_string() => {}
        Some(_) => errors.push("schema violation: Moc is not a string".to_string()),
        None => errors.push("schema violation: missing Moc".to_string()),
    }

    if let Some(textures) = refs.get("Textures") {
        match textures.as_array() {
            Some(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    if !entry.is_string() {
                        errors.push(format!("schema violation: Textures[{i}] is not a string"));
                    }
                }
            }
            None => errors.push("schema violation: Textures is not an array".to_string()),
        }
    }

    for key in ["Physics", "Pose"] {
        if let Some(v) = refs.get(key) {
            if !v.is_string() {
                errors.push(format!("schema violation: {key} is not a string"));
            }
        }
    }

    if let Some(motions) = refs.get("Motions") {
        match motions.as_object() {
            Some(groups) => {
                for (group, entries) in groups {
                    let Some(entries) = entries.as_array() else {
                        errors.push(format!(
                            "schema violation: motion group '{group}' is not a list"
                        ));
                        continue;
                    };
                    for (i, entry) in entries.iter().enumerate() {
                        match entry.get("File") {
                            Some(v) if v.is_string() => {}
                            _ => errors.push(format!(
                                "schema violation: motion group '{group}' entry {i} has no File"
                            )),
                        }
                    }
                }
            }
            None => errors.push("schema violation: Motions is not an object".to_string()),
        }
    }

    if let Some(expressions) = refs.get("Expressions") {
        match expressions.as_array() {
            Some(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    for key in ["Name", "File"] {
                        match entry.get(key) {
                            Some(v) if v.is_string() => {}
                            _ => errors.push(format!(
                                "schema violation: Expressions[{i}] has no {key}"
                            )),
                        }
                    }
                }
            }
            None => errors.push("schema violation: Expressions is not an array".to_string()),
        }
    }

    if let Some(groups) = root.get("Groups") {
        match groups.as_array() {
            Some(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    for key in ["Target", "Name", "Ids"] {
                        if entry.get(key).is_none() {
                            errors.push(format!("schema violation: Groups[{i}] has no {key}"));
                        }
                    }
                }
            }
            None => errors.push("schema violation: Groups is not an array".to_string()),
        }
    }

    if let Some(hit_areas) = root.get("HitAreas") {
        match hit_areas.as_array() {
            Some(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    if entry.get("Id").is_none() {
                        errors.push(format!("schema violation: HitAreas[{i}] has no Id"));
                    }
                }
            }
            None => errors.push("schema violation: HitAreas is not an array".to_string()),
        }
    }
}

impl SectionView {
    /// Extract whatever is well-formed; wrong-typed sections are skipped.
    pub(crate) fn extract(manifest: &Value) -> Self {
        let mut view = Self::default();
        let refs = manifest.get("FileReferences");

        view.moc = str_field(refs, "Moc");
        view.physics = str_field(refs, "Physics");
        view.pose = str_field(refs, "Pose");

        if let Some(textures) = refs.and_then(|r| r.get("Textures")).and_then(Value::as_array) {
            view.textures = textures
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
        }

        if let Some(groups) = refs.and_then(|r| r.get("Motions")).and_then(Value::as_object) {
            for (group, entries) in groups {
                let Some(entries) = entries.as_array() else {
                    continue;
                };
                let files = entries
                    .iter()
                    .map(|e| e.get("File").and_then(Value::as_str).map(str::to_string))
                    .collect();
                view.motions.push((group.clone(), files));
            }
        }

        if let Some(expressions) = refs
            .and_then(|r| r.get("Expressions"))
            .and_then(Value::as_array)
        {
            view.expressions = expressions
                .iter()
                .map(|e| e.get("File").and_then(Value::as_str).map(str::to_string))
                .collect();
        }

        if let Some(groups) = manifest.get("Groups").and_then(Value::as_array) {
            for group in groups {
                let target = group
                    .get("Target")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let ids = group
                    .get("Ids")
                    .and_then(Value::as_array)
                    .map(|ids| {
                        ids.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                view.groups.push((target, ids));
            }
        }

        view
    }
}

fn str_field(refs: Option<&Value>, key: &str) -> Option<String> {
    refs.and_then(|r| r.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

//! Part compilation: source → processed content → payload + fingerprint.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use itemsync_core::types::{
    CompiledPart, DefinitionConfig, DefinitionPart, Fingerprint, ItemDefinition, PayloadType,
    ProcessingMode,
};

use crate::engine::{validate_token_keys, TemplateEngine};
use crate::error::{source_err, CompileError};
use crate::params::apply_parameters;
use crate::transforms::{base64_encode, json_normalize};

/// Compiles definition parts, resolving relative sources against `base_dir`.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    base_dir: PathBuf,
}

impl Compiler {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Compile one part.
    ///
    /// Only reads the source file. Binary (non UTF-8) sources are passed
    /// through untouched regardless of processing mode.
    pub fn compile_part(&self, part: &DefinitionPart) -> Result<CompiledPart, CompileError> {
        if part.processing_mode == ProcessingMode::TemplateSubstitution {
            validate_token_keys(&part.tokens)?;
        }

        let path = self.base_dir.join(&part.source);
        let raw = std::fs::read(&path).map_err(|e| source_err(&path, e))?;
        let content = match String::from_utf8(raw) {
            Ok(text) => process_text(text, part, &path)?.into_bytes(),
            Err(binary) => binary.into_bytes(),
        };

        let fingerprint = fingerprint(&content, part);
        tracing::debug!(
            "compiled {} ({}, {} bytes) -> {fingerprint}",
            path.display(),
            part.processing_mode,
            content.len()
        );
        Ok(CompiledPart {
            part: part.clone(),
            payload: base64_encode(&content),
            payload_type: PayloadType::InlineBase64,
            fingerprint,
        })
    }

    /// Compile every part of `config`; the result is ordered by path.
    pub fn compile_definition(&self, config: &DefinitionConfig) -> Result<ItemDefinition, CompileError> {
        let parts = config
            .parts
            .iter()
            .map(|(path, part)| Ok((path.clone(), self.compile_part(part)?)))
            .collect::<Result<_, CompileError>>()?;
        Ok(ItemDefinition {
            format: config.format.clone(),
            parts,
        })
    }
}

/// Compile content that does not come from a file, such as a kind's empty
/// definition placeholder. `label` is recorded as the part's source.
pub fn compile_inline(label: &str, content: &str) -> CompiledPart {
    let part = DefinitionPart::verbatim(label);
    let content = json_normalize(content).unwrap_or_else(|| content.to_string());
    CompiledPart {
        payload: base64_encode(content.as_bytes()),
        payload_type: PayloadType::InlineBase64,
        fingerprint: fingerprint(content.as_bytes(), &part),
        part,
    }
}

fn process_text(text: String, part: &DefinitionPart, path: &Path) -> Result<String, CompileError> {
    let processed = match part.processing_mode {
        ProcessingMode::None => text,
        ProcessingMode::TemplateSubstitution => {
            TemplateEngine::new(part.delimiter).render(&text, &part.tokens, path)?
        }
        ProcessingMode::ParameterSubstitution => apply_parameters(&text, &part.parameters)?,
    };
    Ok(json_normalize(&processed).unwrap_or(processed))
}

/// SHA-256 over the processed content and every processing input.
///
/// Each field is length-prefixed so adjacent values cannot run together.
pub fn fingerprint(content: &[u8], part: &DefinitionPart) -> Fingerprint {
    let mut hasher = Sha256::new();
    frame(&mut hasher, content);
    frame(&mut hasher, part.processing_mode.as_str().as_bytes());
    hasher.update((part.tokens.len() as u64).to_le_bytes());
    for (key, value) in &part.tokens {
        frame(&mut hasher, key.as_bytes());
        frame(&mut hasher, value.as_bytes());
    }
    hasher.update((part.parameters.len() as u64).to_le_bytes());
    for rule in &part.parameters {
        frame(&mut hasher, rule.kind.as_str().as_bytes());
        frame(&mut hasher, rule.find.as_bytes());
        frame(&mut hasher, rule.value.as_bytes());
    }
    frame(&mut hasher, part.delimiter.as_str().as_bytes());
    Fingerprint(hex::encode(hasher.finalize()))
}

fn frame(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemsync_core::types::{ParameterKind, ParameterRule, TokensDelimiter};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn fingerprint_is_deterministic() {
        let part = DefinitionPart::verbatim("a.json");
        assert_eq!(fingerprint(b"{}", &part), fingerprint(b"{}", &part));
        assert_eq!(fingerprint(b"{}", &part).0.len(), 64);
    }

    #[test]
    fn each_input_changes_fingerprint() {
        let base = DefinitionPart::verbatim("a.json");
        let reference = fingerprint(b"x", &base);

        let mut mode = base.clone();
        mode.processing_mode = ProcessingMode::TemplateSubstitution;
        let mut tokens = base.clone();
        tokens.tokens = BTreeMap::from([("K".to_string(), "V".to_string())]);
        let mut delimiter = base.clone();
        delimiter.delimiter = TokensDelimiter::Angles;
        let rule = ParameterRule {
            kind: ParameterKind::TextReplace,
            find: "dev".to_string(),
            value: "prod".to_string(),
        };
        let mut parameters = base.clone();
        parameters.parameters = vec![rule.clone()];
        let mut parameter_value = base.clone();
        parameter_value.parameters = vec![ParameterRule {
            value: "test".to_string(),
            ..rule
        }];

        assert_ne!(fingerprint(b"y", &base), reference);
        assert_ne!(fingerprint(b"x", &mode), reference);
        assert_ne!(fingerprint(b"x", &tokens), reference);
        assert_ne!(fingerprint(b"x", &delimiter), reference);
        assert_ne!(fingerprint(b"x", &parameters), reference);
        assert_ne!(fingerprint(b"x", &parameters), fingerprint(b"x", &parameter_value));
    }

    #[test]
    fn source_is_resolved_against_base_dir() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "hi").unwrap();
        let compiled = Compiler::new(tmp.path())
            .compile_part(&DefinitionPart::verbatim("a.txt"))
            .unwrap();
        assert_eq!(compiled.payload, "aGk=");
        assert_eq!(compiled.part.source, PathBuf::from("a.txt"));
    }

    #[test]
    fn inline_content_is_normalized() {
        let a = compile_inline("empty", "{ }");
        let b = compile_inline("empty", "{}");
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.payload, "e30=");
    }
}

// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![doc = "Code generator for the `sia` tag table.\n\n\
          Renders `sia/src/tags_gen.rs` from `sia/tags.json`.\n"]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

#[derive(Deserialize, Clone)]
struct Spec {
    version: u32,
    tags: Vec<TagSpec>,
}

#[derive(Deserialize, Clone)]
struct TagSpec {
    name: String,
    mnemonic: String,
    byte: String,
    family: String,
    block: bool,
    payload: String,
    #[serde(default)]
    width: Option<u8>,
    #[serde(default)]
    operands: Vec<String>,
    doc: Option<String>,
}

fn parse_u8_hex(s: &str) -> Result<u8> {
    let s = s.trim();
    let raw = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(raw, 16).with_context(|| format!("invalid tag byte '{s}'"))
}

fn fmt_hex_u8(b: u8) -> String {
    format!("0x{b:02X}")
}

fn sort_and_validate(tags: &mut [(u8, TagSpec)]) -> Result<()> {
    tags.sort_by(|(b0, t0), (b1, t1)| b0.cmp(b1).then_with(|| t0.name.cmp(&t1.name)));

    for w in tags.windows(2) {
        let (b0, t0) = &w[0];
        let (b1, t1) = &w[1];
        if b0 == b1 {
            bail!(
                "duplicate tag byte {}: {} and {}",
                fmt_hex_u8(*b0),
                t0.name,
                t1.name
            );
        }
    }
    let mut names: Vec<&str> = tags.iter().map(|(_, t)| t.name.as_str()).collect();
    names.sort_unstable();
    for w in names.windows(2) {
        if w[0] == w[1] {
            bail!("duplicate tag name '{}'", w[0]);
        }
    }
    Ok(())
}

fn family_rust(family: &str) -> Result<&'static str> {
    Ok(match family {
        "data" => "TagFamily::Data",
        "program" => "TagFamily::Program",
        "control" => "TagFamily::Control",
        other => bail!("unknown tag family '{other}'"),
    })
}

fn payload_rust(tag: &TagSpec) -> Result<String> {
    let needs_width = matches!(tag.payload.as_str(), "uint" | "len");
    match (needs_width, tag.width) {
        (true, None) => bail!("tag {} payload '{}' needs a width", tag.name, tag.payload),
        (false, Some(_)) => bail!("tag {} payload '{}' takes no width", tag.name, tag.payload),
        (true, Some(w)) if !(1..=8).contains(&w) => {
            bail!("tag {} has invalid width {w}", tag.name)
        }
        _ => {}
    }
    if (tag.payload == "operands") == tag.operands.is_empty() {
        bail!(
            "tag {}: operand list must be present exactly for 'operands' payloads",
            tag.name
        );
    }
    let width = tag.width.unwrap_or_default();
    Ok(match tag.payload.as_str() {
        "none" => "PayloadKind::None".to_string(),
        "uint" => format!("PayloadKind::UInt({width})"),
        "uint_n" => "PayloadKind::UIntN".to_string(),
        "f64" => "PayloadKind::F64".to_string(),
        "len" => format!("PayloadKind::Len({width})"),
        "width" => "PayloadKind::Width".to_string(),
        "operands" => "PayloadKind::Operands".to_string(),
        other => bail!("unknown payload '{other}' for tag {}", tag.name),
    })
}

fn operand_role_rust(role: &str) -> Result<&'static str> {
    Ok(match role {
        "dst" => "OperandRole::Dst",
        "src" => "OperandRole::Src",
        "lhs" => "OperandRole::Lhs",
        "rhs" => "OperandRole::Rhs",
        "test" => "OperandRole::Test",
        "block" => "OperandRole::Block",
        "target" => "OperandRole::Target",
        "code" => "OperandRole::Code",
        "args" => "OperandRole::Args",
        other => bail!("unknown operand role '{other}'"),
    })
}

fn generate(spec: Spec) -> Result<String> {
    if spec.version != 1 {
        bail!("unsupported tags.json version {}", spec.version);
    }

    let mut tags: Vec<(u8, TagSpec)> = Vec::with_capacity(spec.tags.len());
    for tag in spec.tags {
        let b = parse_u8_hex(&tag.byte)?;
        tags.push((b, tag));
    }
    sort_and_validate(&mut tags)?;

    let mut out = String::new();
    out.push_str("// Copyright 2026 the Sia Authors\n");
    out.push_str("// SPDX-License-Identifier: Apache-2.0 OR MIT\n\n");
    out.push_str("// @generated by sia_codegen. Do not edit by hand.\n\n");

    out.push_str("/// Tag families sharing the one-byte tag space.\n");
    out.push_str("#[derive(Copy, Clone, Debug, PartialEq, Eq)]\n");
    out.push_str("pub enum TagFamily {\n");
    out.push_str("    /// Primitives, containers and constructor calls.\n");
    out.push_str("    Data,\n");
    out.push_str("    /// Program structure and instructions.\n");
    out.push_str("    Program,\n");
    out.push_str("    /// Address width and end-of-stream.\n");
    out.push_str("    Control,\n");
    out.push_str("}\n\n");

    out.push_str("/// Payload layout following a tag byte.\n");
    out.push_str("#[derive(Copy, Clone, Debug, PartialEq, Eq)]\n");
    out.push_str("pub enum PayloadKind {\n");
    out.push_str("    /// No payload.\n");
    out.push_str("    None,\n");
    out.push_str("    /// Little-endian unsigned integer of a fixed byte width.\n");
    out.push_str("    UInt(u8),\n");
    out.push_str("    /// A `u8` byte count, then a little-endian unsigned integer of that width.\n");
    out.push_str("    UIntN,\n");
    out.push_str("    /// 8-byte little-endian IEEE754 double.\n");
    out.push_str("    F64,\n");
    out.push_str("    /// Little-endian length of a fixed byte width, then that many bytes.\n");
    out.push_str("    Len(u8),\n");
    out.push_str("    /// A single `u8` operand width.\n");
    out.push_str("    Width,\n");
    out.push_str("    /// Operands at the current address width, see [`Tag::operand_roles`].\n");
    out.push_str("    Operands,\n");
    out.push_str("}\n\n");

    out.push_str("/// Roles of address-width operands.\n");
    out.push_str("#[allow(missing_docs, reason = \"generated\")]\n");
    out.push_str("#[derive(Copy, Clone, Debug, PartialEq, Eq)]\n");
    out.push_str("pub enum OperandRole {\n");
    for role in [
        "Dst", "Src", "Lhs", "Rhs", "Test", "Block", "Target", "Code", "Args",
    ] {
        out.push_str(&format!("    {role},\n"));
    }
    out.push_str("}\n\n");

    out.push_str("/// One-byte Sia tags.\n");
    out.push_str("#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]\n");
    out.push_str("#[repr(u8)]\n");
    out.push_str("pub enum Tag {\n");
    for (b, tag) in &tags {
        if let Some(doc) = &tag.doc {
            out.push_str(&format!("    /// {doc}\n"));
        }
        out.push_str(&format!("    {} = {},\n", tag.name, fmt_hex_u8(*b)));
    }
    out.push_str("}\n\n");

    out.push_str("/// Number of assigned tags.\n");
    out.push_str(&format!("pub const TAG_COUNT: usize = {};\n\n", tags.len()));
    out.push_str("/// All assigned tags in byte order.\n");
    out.push_str("pub const ALL_TAGS: [Tag; TAG_COUNT] = [\n");
    for (_, tag) in &tags {
        out.push_str(&format!("    Tag::{},\n", tag.name));
    }
    out.push_str("];\n\n");

    out.push_str("impl Tag {\n");

    out.push_str("    /// Parses a tag from its byte value.\n");
    out.push_str("    #[must_use]\n");
    out.push_str("    pub const fn from_u8(b: u8) -> Option<Self> {\n");
    out.push_str("        match b {\n");
    for (b, tag) in &tags {
        out.push_str(&format!(
            "            {} => Some(Self::{}),\n",
            fmt_hex_u8(*b),
            tag.name
        ));
    }
    out.push_str("            _ => None,\n");
    out.push_str("        }\n");
    out.push_str("    }\n\n");

    out.push_str("    /// Returns the tag mnemonic.\n");
    out.push_str("    #[must_use]\n");
    out.push_str("    pub const fn mnemonic(self) -> &'static str {\n");
    out.push_str("        match self {\n");
    for (_, tag) in &tags {
        out.push_str(&format!(
            "            Self::{} => \"{}\",\n",
            tag.name, tag.mnemonic
        ));
    }
    out.push_str("        }\n");
    out.push_str("    }\n\n");

    out.push_str("    /// Returns the family this tag belongs to.\n");
    out.push_str("    #[must_use]\n");
    out.push_str("    pub const fn family(self) -> TagFamily {\n");
    out.push_str("        match self {\n");
    for (_, tag) in &tags {
        out.push_str(&format!(
            "            Self::{} => {},\n",
            tag.name,
            family_rust(&tag.family)?
        ));
    }
    out.push_str("        }\n");
    out.push_str("    }\n\n");

    out.push_str("    /// Returns the payload layout that follows the tag byte.\n");
    out.push_str("    #[must_use]\n");
    out.push_str("    pub const fn payload(self) -> PayloadKind {\n");
    out.push_str("        match self {\n");
    for (_, tag) in &tags {
        out.push_str(&format!(
            "            Self::{} => {},\n",
            tag.name,
            payload_rust(tag)?
        ));
    }
    out.push_str("        }\n");
    out.push_str("    }\n\n");

    out.push_str("    /// Returns `true` if decoding this tag assigns the next block index.\n");
    out.push_str("    #[must_use]\n");
    out.push_str("    pub const fn produces_block(self) -> bool {\n");
    out.push_str("        match self {\n");
    for (_, tag) in &tags {
        out.push_str(&format!("            Self::{} => {},\n", tag.name, tag.block));
    }
    out.push_str("        }\n");
    out.push_str("    }\n\n");

    out.push_str("    /// Returns the roles of the address-width operands carried by this tag.\n");
    out.push_str("    #[must_use]\n");
    out.push_str("    pub const fn operand_roles(self) -> &'static [OperandRole] {\n");
    out.push_str("        match self {\n");
    for (_, tag) in &tags {
        let mut roles = Vec::with_capacity(tag.operands.len());
        for role in &tag.operands {
            roles.push(operand_role_rust(role)?);
        }
        out.push_str(&format!(
            "            Self::{} => &[{}],\n",
            tag.name,
            roles.join(", ")
        ));
    }
    out.push_str("        }\n");
    out.push_str("    }\n");

    out.push_str("}\n");
    Ok(out)
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let spec_path: PathBuf = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sia/tags.json"));
    let out_path: PathBuf = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sia/src/tags_gen.rs"));
    if args.next().is_some() {
        bail!("usage: sia_codegen [tags.json] [tags_gen.rs]");
    }

    let json =
        fs::read_to_string(&spec_path).with_context(|| format!("read {}", spec_path.display()))?;
    let spec: Spec = serde_json::from_str(&json)
        .with_context(|| format!("parse {}", spec_path.display()))?;
    let rendered = generate(spec)?;

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(&out_path, rendered.as_bytes())
        .with_context(|| format!("write {}", out_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize_newlines(s: &str) -> String {
        s.replace("\r\n", "\n").replace('\r', "\n")
    }

    fn spec_from(json: &str) -> Spec {
        serde_json::from_str(json).expect("parse spec")
    }

    #[test]
    fn generated_file_is_up_to_date() {
        let workspace_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let workspace_root = workspace_root.parent().expect("workspace root");

        let spec_path = workspace_root.join("sia/tags.json");
        let out_path = workspace_root.join("sia/src/tags_gen.rs");

        let json = fs::read_to_string(&spec_path).expect("read tags.json");
        let rendered = generate(spec_from(&json)).expect("render tags_gen.rs");
        let existing = fs::read_to_string(&out_path).expect("read tags_gen.rs");

        assert_eq!(
            normalize_newlines(&rendered),
            normalize_newlines(&existing),
            "tags_gen.rs is out of date; re-run: cargo run -p sia_codegen"
        );
    }

    #[test]
    fn duplicate_bytes_are_rejected() {
        let spec = spec_from(
            r#"{"version":1,"tags":[
                {"name":"A","mnemonic":"a","byte":"0x01","family":"data","block":true,"payload":"none"},
                {"name":"B","mnemonic":"b","byte":"0x01","family":"data","block":true,"payload":"none"}
            ]}"#,
        );
        let err = generate(spec).err().expect("duplicate byte");
        assert!(err.to_string().contains("duplicate tag byte 0x01"));
    }

    #[test]
    fn operand_payload_requires_roles() {
        let spec = spec_from(
            r#"{"version":1,"tags":[
                {"name":"A","mnemonic":"a","byte":"0x01","family":"data","block":false,"payload":"operands"}
            ]}"#,
        );
        assert!(generate(spec).is_err());
    }

    #[test]
    fn width_is_checked() {
        let spec = spec_from(
            r#"{"version":1,"tags":[
                {"name":"A","mnemonic":"a","byte":"0x01","family":"data","block":true,"payload":"uint","width":9}
            ]}"#,
        );
        assert!(generate(spec).is_err());
    }
}

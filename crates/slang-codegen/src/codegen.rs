//! Module-level IR generation: signature collection and declaration
//! rendering. Function bodies are handled by the per-function emitter.

use std::collections::HashMap;

use log::debug;
use slang_syntax::ast::{PluhDeclaration, Prototype, TeaSpill, VOID_TYPE};
use slang_syntax::error::{codegen_error, Result};

use crate::emitter::FunctionEmitter;

/// IR-level value types, one per recognized S-Lang type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IrType {
    I64,
    F64,
    I1,
    I8,
    Ptr,
    Void,
}

impl IrType {
    pub(crate) fn name(self) -> &'static str {
        match self {
            IrType::I64 => "i64",
            IrType::F64 => "double",
            IrType::I1 => "i1",
            IrType::I8 => "i8",
            IrType::Ptr => "ptr",
            IrType::Void => "void",
        }
    }

    pub(crate) fn from_type_name(name: &str) -> Result<IrType> {
        match name {
            "int" => Ok(IrType::I64),
            "float" => Ok(IrType::F64),
            "bool" => Ok(IrType::I1),
            "char" => Ok(IrType::I8),
            "string" => Ok(IrType::Ptr),
            VOID_TYPE => Ok(IrType::Void),
            other => codegen_error(format!("Unknown type name: {other}")),
        }
    }
}

/// A typed value rendered into IR text: a register (`%t3`), a constant
/// (`1337`, `true`) or a global (`@.str.0`). Void values have an empty repr.
#[derive(Debug, Clone)]
pub(crate) struct IrValue {
    pub ty: IrType,
    pub repr: String,
}

/// Resolved function signature, shared by call sites and the emitter.
#[derive(Debug, Clone)]
pub(crate) struct Signature {
    pub params: Vec<IrType>,
    pub ret: IrType,
}

fn signature_of(proto: &Prototype) -> Result<Signature> {
    let mut params = Vec::with_capacity(proto.args.len());
    for arg in &proto.args {
        let ty = IrType::from_type_name(&arg.ty)?;
        if ty == IrType::Void {
            return codegen_error(format!(
                "Argument '{}' of '{}' cannot be {}",
                arg.name, proto.name, VOID_TYPE
            ));
        }
        params.push(ty);
    }
    Ok(Signature {
        params,
        ret: IrType::from_type_name(&proto.return_type)?,
    })
}

/// Translates a parsed [`TeaSpill`] into a textual IR module.
///
/// The walk is two-pass: signatures are collected first so a call site can be
/// checked against any declaration in the module, then each declaration is
/// rendered as a `declare` (extern) or `define` (definition).
pub struct Codegen {
    signatures: HashMap<String, Signature>,
    string_globals: Vec<String>,
}

impl Default for Codegen {
    fn default() -> Self {
        Self::new()
    }
}

impl Codegen {
    pub fn new() -> Self {
        Self {
            signatures: HashMap::new(),
            string_globals: Vec::new(),
        }
    }

    pub(crate) fn signature(&self, name: &str) -> Option<&Signature> {
        self.signatures.get(name)
    }

    /// Register a string literal as a module-level constant and return the
    /// global's name.
    pub(crate) fn intern_string(&mut self, value: &str) -> String {
        let name = format!("@.str.{}", self.string_globals.len());
        self.string_globals.push(format!(
            "{name} = private unnamed_addr constant [{} x i8] c\"{}\\00\"",
            value.len() + 1,
            escape_bytes(value)
        ));
        name
    }

    /// Render the whole module.
    pub fn generate(&mut self, module: &TeaSpill) -> Result<String> {
        debug!("codegen: module {}", module.name);

        for decl in &module.declarations {
            let proto = &decl.prototype;
            if self.signatures.contains_key(&proto.name) {
                return codegen_error(format!("Duplicate function '{}'", proto.name));
            }
            self.signatures
                .insert(proto.name.clone(), signature_of(proto)?);
        }

        let mut functions = Vec::new();
        for decl in &module.declarations {
            functions.push(self.emit_declaration(decl)?);
        }

        let mut out = format!("; ModuleID = '{}'\n", module.name);
        if !self.string_globals.is_empty() {
            out.push('\n');
            for global in &self.string_globals {
                out.push_str(global);
                out.push('\n');
            }
        }
        for function in &functions {
            out.push('\n');
            out.push_str(function);
        }
        Ok(out)
    }

    fn emit_declaration(&mut self, decl: &PluhDeclaration) -> Result<String> {
        let proto = &decl.prototype;
        let sig = match self.signatures.get(&proto.name) {
            Some(sig) => sig.clone(),
            None => return codegen_error(format!("Unregistered function '{}'", proto.name)),
        };

        match &decl.body {
            None => {
                debug!("codegen: declare {}", proto.name);
                let params: Vec<&str> = sig.params.iter().map(|ty| ty.name()).collect();
                Ok(format!(
                    "declare {} @{}({})\n",
                    sig.ret.name(),
                    proto.name,
                    params.join(", ")
                ))
            }
            Some(body) => {
                debug!("codegen: define {}", proto.name);
                let mut emitter = FunctionEmitter::new(proto, &sig);
                emitter.emit_body(self, body)?;
                Ok(emitter.finish())
            }
        }
    }
}

/// Escape a string literal's bytes for a `c"..."` constant. The trailing NUL
/// is appended by the caller.
fn escape_bytes(value: &str) -> String {
    let mut out = String::new();
    for &byte in value.as_bytes() {
        match byte {
            b'"' | b'\\' => out.push_str(&format!("\\{byte:02X}")),
            0x20..=0x7E => out.push(byte as char),
            _ => out.push_str(&format!("\\{byte:02X}")),
        }
    }
    out
}

//! Per-function IR emission: local slots, numbered temporaries, labeled
//! blocks and the loop context that `ghost` / `rizz` branch through.

use std::collections::HashMap;

use slang_syntax::ast::{Expression, Prototype, Statement, DISCARD_TARGET, VOID_TYPE};
use slang_syntax::error::{codegen_error, Result};

use crate::codegen::{Codegen, IrType, IrValue, Signature};

#[derive(Clone)]
struct Local {
    reg: String,
    ty: IrType,
}

/// Labels `ghost` and `rizz` branch to inside the innermost loop.
struct LoopLabels {
    condition: String,
    merge: String,
}

pub(crate) struct FunctionEmitter {
    name: String,
    ret: IrType,
    header: String,
    lines: Vec<String>,
    locals: HashMap<String, Local>,
    temp_count: usize,
    label_count: usize,
    loop_stack: Vec<LoopLabels>,
    /// The current block already ends in a terminator; anything further in
    /// the same compound is unreachable and dropped.
    terminated: bool,
}

impl FunctionEmitter {
    pub(crate) fn new(proto: &Prototype, sig: &Signature) -> Self {
        let rendered: Vec<String> = sig
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| format!("{} %p{i}", ty.name()))
            .collect();
        let header = format!(
            "define {} @{}({}) {{",
            sig.ret.name(),
            proto.name,
            rendered.join(", ")
        );

        let mut emitter = Self {
            name: proto.name.clone(),
            ret: sig.ret,
            header,
            lines: Vec::new(),
            locals: HashMap::new(),
            temp_count: 0,
            label_count: 0,
            loop_stack: Vec::new(),
            terminated: false,
        };

        emitter.lines.push("entry:".to_string());
        // Give every argument a stack slot so assignments to parameters work
        // the same as assignments to declared variables.
        for (i, (arg, ty)) in proto.args.iter().zip(&sig.params).enumerate() {
            let reg = emitter.fresh_temp();
            emitter.emit(format!("{reg} = alloca {}", ty.name()));
            emitter.emit(format!("store {} %p{i}, ptr {reg}", ty.name()));
            emitter.locals.insert(
                arg.name.clone(),
                Local {
                    reg,
                    ty: *ty,
                },
            );
        }

        emitter
    }

    pub(crate) fn finish(mut self) -> String {
        // Every block needs a terminator.
        if !self.terminated {
            if self.ret == IrType::Void {
                self.emit("ret void");
            } else {
                self.emit("unreachable");
            }
        }
        let mut out = self.header;
        out.push('\n');
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }

    fn emit(&mut self, line: impl Into<String>) {
        self.lines.push(format!("  {}", line.into()));
    }

    fn begin_block(&mut self, label: &str) {
        self.lines.push(format!("{label}:"));
        self.terminated = false;
    }

    fn fresh_temp(&mut self) -> String {
        let reg = format!("%t{}", self.temp_count);
        self.temp_count += 1;
        reg
    }

    fn next_label_group(&mut self) -> usize {
        let n = self.label_count;
        self.label_count += 1;
        n
    }

    fn lookup(&self, name: &str) -> Result<Local> {
        match self.locals.get(name) {
            Some(local) => Ok(local.clone()),
            None => codegen_error(format!("Undefined variable '{name}'")),
        }
    }

    pub(crate) fn emit_body(&mut self, cg: &mut Codegen, body: &Statement) -> Result<()> {
        self.emit_stmt(cg, body)
    }

    fn emit_stmt(&mut self, cg: &mut Codegen, stmt: &Statement) -> Result<()> {
        match stmt {
            Statement::Declare { var_name, var_type } => {
                let ty = IrType::from_type_name(var_type)?;
                if ty == IrType::Void {
                    return codegen_error(format!(
                        "Cannot declare variable '{var_name}' with type {VOID_TYPE}"
                    ));
                }
                let reg = self.fresh_temp();
                self.emit(format!("{reg} = alloca {}", ty.name()));
                self.locals.insert(var_name.clone(), Local { reg, ty });
                Ok(())
            }
            Statement::DeclareAssign {
                var_name,
                var_type,
                expr,
            } => {
                let ty = IrType::from_type_name(var_type)?;
                if ty == IrType::Void {
                    return codegen_error(format!(
                        "Cannot declare variable '{var_name}' with type {VOID_TYPE}"
                    ));
                }
                let value = self.emit_expr(cg, expr)?;
                if value.ty != ty {
                    return codegen_error(format!(
                        "Cannot initialize {} '{}' with a {} value",
                        ty.name(),
                        var_name,
                        value.ty.name()
                    ));
                }
                let reg = self.fresh_temp();
                self.emit(format!("{reg} = alloca {}", ty.name()));
                self.emit(format!("store {} {}, ptr {reg}", ty.name(), value.repr));
                self.locals.insert(var_name.clone(), Local { reg, ty });
                Ok(())
            }
            Statement::Assign { var_name, expr } => {
                if var_name == DISCARD_TARGET {
                    // Call statement: evaluate and drop the result.
                    self.emit_expr(cg, expr)?;
                    return Ok(());
                }
                let local = self.lookup(var_name)?;
                let value = self.emit_expr(cg, expr)?;
                if value.ty != local.ty {
                    return codegen_error(format!(
                        "Cannot assign a {} value to {} '{}'",
                        value.ty.name(),
                        local.ty.name(),
                        var_name
                    ));
                }
                self.emit(format!(
                    "store {} {}, ptr {}",
                    local.ty.name(),
                    value.repr,
                    local.reg
                ));
                Ok(())
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let cond = self.emit_expr(cg, condition)?;
                if cond.ty != IrType::I1 {
                    return codegen_error(format!(
                        "Condition must be a bool expression, got {}",
                        cond.ty.name()
                    ));
                }
                let n = self.next_label_group();
                let then_label = format!("then{n}");
                let else_label = format!("else{n}");
                let merge_label = format!("endif{n}");

                self.emit(format!(
                    "br i1 {}, label %{then_label}, label %{else_label}",
                    cond.repr
                ));
                self.begin_block(&then_label);
                self.emit_stmt(cg, then_branch)?;
                if !self.terminated {
                    self.emit(format!("br label %{merge_label}"));
                }
                self.begin_block(&else_label);
                self.emit_stmt(cg, else_branch)?;
                if !self.terminated {
                    self.emit(format!("br label %{merge_label}"));
                }
                self.begin_block(&merge_label);
                Ok(())
            }
            Statement::While { condition, body } => {
                let n = self.next_label_group();
                let cond_label = format!("cond{n}");
                let body_label = format!("body{n}");
                let merge_label = format!("endloop{n}");

                self.emit(format!("br label %{cond_label}"));
                self.begin_block(&cond_label);
                let cond = self.emit_expr(cg, condition)?;
                if cond.ty != IrType::I1 {
                    return codegen_error(format!(
                        "Condition must be a bool expression, got {}",
                        cond.ty.name()
                    ));
                }
                self.emit(format!(
                    "br i1 {}, label %{body_label}, label %{merge_label}",
                    cond.repr
                ));

                self.begin_block(&body_label);
                self.loop_stack.push(LoopLabels {
                    condition: cond_label.clone(),
                    merge: merge_label.clone(),
                });
                let result = self.emit_stmt(cg, body);
                self.loop_stack.pop();
                result?;
                if !self.terminated {
                    self.emit(format!("br label %{cond_label}"));
                }
                self.begin_block(&merge_label);
                Ok(())
            }
            Statement::Break => match self.loop_stack.last() {
                Some(labels) => {
                    self.emit(format!("br label %{}", labels.merge));
                    self.terminated = true;
                    Ok(())
                }
                None => codegen_error("'ghost' outside of a loop"),
            },
            Statement::Continue => match self.loop_stack.last() {
                Some(labels) => {
                    self.emit(format!("br label %{}", labels.condition));
                    self.terminated = true;
                    Ok(())
                }
                None => codegen_error("'rizz' outside of a loop"),
            },
            Statement::Return(expr) => {
                let value = self.emit_expr(cg, expr)?;
                if value.ty != self.ret {
                    return codegen_error(format!(
                        "Return value of type {} does not match {} for '{}'",
                        value.ty.name(),
                        self.ret.name(),
                        self.name
                    ));
                }
                if value.ty == IrType::Void {
                    self.emit("ret void");
                } else {
                    self.emit(format!("ret {} {}", value.ty.name(), value.repr));
                }
                self.terminated = true;
                Ok(())
            }
            Statement::Compound(statements) => {
                for stmt in statements {
                    if self.terminated {
                        // Unreachable tail of the block; nothing to emit.
                        break;
                    }
                    self.emit_stmt(cg, stmt)?;
                }
                Ok(())
            }
        }
    }

    fn emit_expr(&mut self, cg: &mut Codegen, expr: &Expression) -> Result<IrValue> {
        match expr {
            Expression::LiteralInt(value) => Ok(IrValue {
                ty: IrType::I64,
                repr: value.to_string(),
            }),
            Expression::LiteralFloat(value) => Ok(IrValue {
                ty: IrType::F64,
                // Bit-exact double constant.
                repr: format!("0x{:016X}", value.to_bits()),
            }),
            Expression::LiteralBool(value) => Ok(IrValue {
                ty: IrType::I1,
                repr: if *value { "true" } else { "false" }.to_string(),
            }),
            Expression::LiteralChar(value) => Ok(IrValue {
                ty: IrType::I8,
                repr: (*value as u32 as u8).to_string(),
            }),
            Expression::LiteralString(value) => {
                let global = cg.intern_string(value);
                Ok(IrValue {
                    ty: IrType::Ptr,
                    repr: global,
                })
            }
            Expression::Variable(name) => {
                let local = self.lookup(name)?;
                let reg = self.fresh_temp();
                self.emit(format!(
                    "{reg} = load {}, ptr {}",
                    local.ty.name(),
                    local.reg
                ));
                Ok(IrValue {
                    ty: local.ty,
                    repr: reg,
                })
            }
            Expression::Unary { op, rhs } => {
                let value = self.emit_expr(cg, rhs)?;
                self.emit_unary(op, value)
            }
            Expression::Binary { op, lhs, rhs } => {
                let left = self.emit_expr(cg, lhs)?;
                let right = self.emit_expr(cg, rhs)?;
                self.emit_binary(op, left, right)
            }
            Expression::Call { callee, args } => {
                let sig = match cg.signature(callee) {
                    Some(sig) => sig.clone(),
                    None => return codegen_error(format!("Undefined function '{callee}'")),
                };
                if sig.params.len() != args.len() {
                    return codegen_error(format!(
                        "Function '{}' expects {} arguments, got {}",
                        callee,
                        sig.params.len(),
                        args.len()
                    ));
                }

                let mut rendered = Vec::with_capacity(args.len());
                for (arg, expected) in args.iter().zip(&sig.params) {
                    let value = self.emit_expr(cg, arg)?;
                    if value.ty != *expected {
                        return codegen_error(format!(
                            "Argument of type {} does not match {} calling '{}'",
                            value.ty.name(),
                            expected.name(),
                            callee
                        ));
                    }
                    rendered.push(format!("{} {}", value.ty.name(), value.repr));
                }

                if sig.ret == IrType::Void {
                    self.emit(format!("call void @{callee}({})", rendered.join(", ")));
                    Ok(IrValue {
                        ty: IrType::Void,
                        repr: String::new(),
                    })
                } else {
                    let reg = self.fresh_temp();
                    self.emit(format!(
                        "{reg} = call {} @{callee}({})",
                        sig.ret.name(),
                        rendered.join(", ")
                    ));
                    Ok(IrValue {
                        ty: sig.ret,
                        repr: reg,
                    })
                }
            }
        }
    }

    fn emit_unary(&mut self, op: &str, value: IrValue) -> Result<IrValue> {
        match op {
            "+" => match value.ty {
                IrType::I64 | IrType::F64 => Ok(value),
                other => codegen_error(format!(
                    "Unary + requires a numeric operand, got {}",
                    other.name()
                )),
            },
            "-" => match value.ty {
                IrType::I64 => {
                    let reg = self.fresh_temp();
                    self.emit(format!("{reg} = sub i64 0, {}", value.repr));
                    Ok(IrValue {
                        ty: IrType::I64,
                        repr: reg,
                    })
                }
                IrType::F64 => {
                    let reg = self.fresh_temp();
                    self.emit(format!("{reg} = fneg double {}", value.repr));
                    Ok(IrValue {
                        ty: IrType::F64,
                        repr: reg,
                    })
                }
                other => codegen_error(format!(
                    "Unary - requires a numeric operand, got {}",
                    other.name()
                )),
            },
            "!" => match value.ty {
                IrType::I1 => {
                    let reg = self.fresh_temp();
                    self.emit(format!("{reg} = xor i1 {}, true", value.repr));
                    Ok(IrValue {
                        ty: IrType::I1,
                        repr: reg,
                    })
                }
                other => codegen_error(format!(
                    "Unary ! requires a bool operand, got {}",
                    other.name()
                )),
            },
            other => codegen_error(format!("Unknown unary operator {other}")),
        }
    }

    fn emit_binary(&mut self, op: &str, left: IrValue, right: IrValue) -> Result<IrValue> {
        if left.ty != right.ty {
            return codegen_error(format!(
                "Type mismatch in binary {}: {} vs {}",
                op,
                left.ty.name(),
                right.ty.name()
            ));
        }

        let arithmetic = matches!(op, "+" | "-" | "*" | "/" | "%");
        if arithmetic {
            let instruction = match (op, left.ty) {
                ("+", IrType::I64) => "add",
                ("-", IrType::I64) => "sub",
                ("*", IrType::I64) => "mul",
                ("/", IrType::I64) => "sdiv",
                ("%", IrType::I64) => "srem",
                ("+", IrType::F64) => "fadd",
                ("-", IrType::F64) => "fsub",
                ("*", IrType::F64) => "fmul",
                ("/", IrType::F64) => "fdiv",
                ("%", IrType::F64) => "frem",
                (_, other) => {
                    return codegen_error(format!(
                        "Binary {} requires numeric operands, got {}",
                        op,
                        other.name()
                    ))
                }
            };
            let reg = self.fresh_temp();
            self.emit(format!(
                "{reg} = {instruction} {} {}, {}",
                left.ty.name(),
                left.repr,
                right.repr
            ));
            return Ok(IrValue {
                ty: left.ty,
                repr: reg,
            });
        }

        // Comparisons: signed integer compare for the integer-shaped types,
        // ordered float compare for doubles.
        let instruction = match left.ty {
            IrType::I64 | IrType::I8 | IrType::I1 => match op {
                "==" => "icmp eq",
                "!=" => "icmp ne",
                "<" => "icmp slt",
                "<=" => "icmp sle",
                ">" => "icmp sgt",
                ">=" => "icmp sge",
                other => return codegen_error(format!("Unknown binary operator {other}")),
            },
            IrType::F64 => match op {
                "==" => "fcmp oeq",
                "!=" => "fcmp one",
                "<" => "fcmp olt",
                "<=" => "fcmp ole",
                ">" => "fcmp ogt",
                ">=" => "fcmp oge",
                other => return codegen_error(format!("Unknown binary operator {other}")),
            },
            other => {
                return codegen_error(format!(
                    "Cannot compare {} values with {}",
                    other.name(),
                    op
                ))
            }
        };
        let reg = self.fresh_temp();
        self.emit(format!(
            "{reg} = {instruction} {} {}, {}",
            left.ty.name(),
            left.repr,
            right.repr
        ));
        Ok(IrValue {
            ty: IrType::I1,
            repr: reg,
        })
    }
}

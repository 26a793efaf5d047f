//! Recursive-descent parser with operator-precedence expression parsing.

use log::debug;
use slang_lexer::Lexer;
use slang_syntax::ast::{
    Argument, Expression, PluhDeclaration, Prototype, Statement, TeaSpill, DISCARD_TARGET,
    VOID_TYPE,
};
use slang_syntax::error::{parse_logic, Error, ErrorKind, Result};
use slang_syntax::token::{Token, TokenKind};

/// The parser: owns the lexer and a one-token look-ahead.
///
/// Every `parse_*` routine leaves `current` on the first token after the
/// construct it consumed. The first error aborts the parse; no recovery is
/// attempted.
pub struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    /// Create a parser over the given source and prime the look-ahead.
    pub fn new(code: &str) -> Result<Self> {
        let mut lexer = Lexer::new(code);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    /// Precedence of the current token as a binary operator; any token that
    /// is not a binary operator reports -1 so the Pratt loop stops on it.
    fn op_precedence(&self) -> i32 {
        match self.current.lexeme.as_str() {
            "<" | "<=" | ">" | ">=" | "==" | "!=" => 10,
            "+" | "-" => 20,
            "*" | "/" | "%" => 40,
            _ => -1,
        }
    }

    /// Parse a full expression: a unary expression fed into the binary
    /// operator climbing loop.
    pub fn parse_expression(&mut self) -> Result<Expression> {
        debug!("parser: expression");
        let lhs = self.parse_unary_expression()?;
        self.parse_binary_op_rhs(0, lhs)
    }

    fn parse_binary_op_rhs(
        &mut self,
        expression_precedence: i32,
        mut lhs: Expression,
    ) -> Result<Expression> {
        loop {
            let token_precedence = self.op_precedence();
            if token_precedence < expression_precedence {
                return Ok(lhs);
            }

            let op = self.current.lexeme.clone();
            self.advance()?;
            let mut rhs = self.parse_unary_expression()?;

            // A tighter-binding operator on the right claims the rhs first.
            if token_precedence < self.op_precedence() {
                rhs = self.parse_binary_op_rhs(token_precedence + 1, rhs)?;
            }

            lhs = Expression::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_unary_expression(&mut self) -> Result<Expression> {
        if self.current.kind == TokenKind::Operator
            && matches!(self.current.lexeme.as_str(), "+" | "-" | "!")
        {
            let op = self.current.lexeme.clone();
            self.advance()?;

            if matches!(self.current.kind, TokenKind::Char | TokenKind::Str) {
                return parse_logic(format!(
                    "Unary operator cannot be applied to char or string: {}",
                    self.current.lexeme
                ));
            }

            let rhs = self.parse_unary_expression()?;
            return Ok(Expression::Unary {
                op,
                rhs: Box::new(rhs),
            });
        }

        self.parse_atomic()
    }

    /// Parse the simplest expressions: literals, identifiers or a
    /// parenthesized sub-expression.
    fn parse_atomic(&mut self) -> Result<Expression> {
        match self.current.kind {
            TokenKind::Identifier => self.parse_identifier_or_call(),
            TokenKind::Int => self.parse_int(),
            TokenKind::Float => self.parse_float(),
            TokenKind::Bool => self.parse_bool(),
            TokenKind::Char => self.parse_char(),
            TokenKind::Str => self.parse_string(),
            TokenKind::Complex if self.current.lexeme == "(" => self.parse_parenthesized(),
            TokenKind::Complex => parse_logic(format!(
                "Expected ( parsing a grouped expression, got: {}",
                self.current.lexeme
            )),
            _ => parse_logic(format!(
                "Unknown token parsing atomic expression, got: {}",
                self.current.lexeme
            )),
        }
    }

    fn parse_int(&mut self) -> Result<Expression> {
        let value: i64 = self.current.lexeme.parse().map_err(|_| {
            Error::new(
                ErrorKind::ParseLogic,
                format!("Integer literal out of range: {}", self.current.lexeme),
            )
        })?;
        self.advance()?;
        Ok(Expression::LiteralInt(value))
    }

    fn parse_float(&mut self) -> Result<Expression> {
        let value: f64 = self.current.lexeme.parse().map_err(|_| {
            Error::new(
                ErrorKind::ParseLogic,
                format!("Invalid float literal: {}", self.current.lexeme),
            )
        })?;
        self.advance()?;
        Ok(Expression::LiteralFloat(value))
    }

    fn parse_bool(&mut self) -> Result<Expression> {
        // `facts` is true, `cap` is false.
        let value = self.current.lexeme == "facts";
        self.advance()?;
        Ok(Expression::LiteralBool(value))
    }

    fn parse_char(&mut self) -> Result<Expression> {
        let value = match self.current.lexeme.chars().next() {
            Some(c) => c,
            None => {
                return parse_logic("Empty char token");
            }
        };
        self.advance()?;
        Ok(Expression::LiteralChar(value))
    }

    fn parse_string(&mut self) -> Result<Expression> {
        let value = self.current.lexeme.clone();
        self.advance()?;
        Ok(Expression::LiteralString(value))
    }

    fn parse_parenthesized(&mut self) -> Result<Expression> {
        self.advance()?; // past '('
        let node = self.parse_expression()?;
        if self.current.lexeme != ")" {
            return parse_logic(format!(
                "Expected ) parsing parenthesized expression, got: {}",
                self.current.lexeme
            ));
        }
        self.advance()?;
        Ok(node)
    }

    /// An identifier is a variable reference unless a `(` follows, in which
    /// case it is a call.
    fn parse_identifier_or_call(&mut self) -> Result<Expression> {
        let name = self.current.lexeme.clone();
        self.advance()?;

        if self.current.lexeme != "(" {
            return Ok(Expression::Variable(name));
        }

        self.advance()?; // past '('
        let args = self.parse_call_arguments()?;
        Ok(Expression::Call { callee: name, args })
    }

    /// Comma-separated expressions; `current` is on the first argument (or
    /// the closing `)`) on entry and past the `)` on exit.
    fn parse_call_arguments(&mut self) -> Result<Vec<Expression>> {
        let mut args = Vec::new();
        if self.current.lexeme != ")" {
            loop {
                args.push(self.parse_expression()?);
                if self.current.lexeme == ")" {
                    break;
                }
                if self.current.lexeme != "," {
                    return parse_logic(format!(
                        "Expected , or ) parsing call arguments, got: {}",
                        self.current.lexeme
                    ));
                }
                self.advance()?;
            }
        }
        self.advance()?; // past ')'
        Ok(args)
    }

    /// Parse a single statement, dispatching on the current token kind.
    pub fn parse_statement(&mut self) -> Result<Statement> {
        debug!("parser: statement");
        match self.current.kind {
            TokenKind::Let => self.parse_let(),
            TokenKind::Identifier => self.parse_assignment_or_call(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Break => {
                self.advance()?;
                Ok(Statement::Break)
            }
            TokenKind::Continue => {
                self.advance()?;
                Ok(Statement::Continue)
            }
            TokenKind::Return => self.parse_return(),
            TokenKind::Complex if self.current.lexeme == "{" => {
                Ok(self.parse_curly_compound()?.0)
            }
            _ => parse_logic(format!(
                "Unknown token parsing statement, got: {}",
                self.current.lexeme
            )),
        }
    }

    /// `cookUp <name> : <type>` with an optional `= <expr>` initializer.
    fn parse_let(&mut self) -> Result<Statement> {
        debug!("parser: let statement");
        self.advance()?; // past cookUp

        if self.current.kind != TokenKind::Identifier {
            return parse_logic(format!(
                "Expected variable name after cookUp, got: {}",
                self.current.lexeme
            ));
        }
        let var_name = self.current.lexeme.clone();
        self.advance()?;

        if self.current.lexeme != ":" {
            return parse_logic(format!(
                "Expected : after variable name, got: {}",
                self.current.lexeme
            ));
        }
        self.advance()?;

        if self.current.kind != TokenKind::Identifier {
            return parse_logic(format!(
                "Expected type name after :, got: {}",
                self.current.lexeme
            ));
        }
        let var_type = self.current.lexeme.clone();
        self.advance()?;

        if self.current.lexeme == "=" {
            self.advance()?;
            let expr = self.parse_expression()?;
            return Ok(Statement::DeclareAssign {
                var_name,
                var_type,
                expr,
            });
        }

        Ok(Statement::Declare { var_name, var_type })
    }

    /// Either `<name> = <expr>` or `<name>(<args>)`. A bare call becomes an
    /// assignment to the discard sentinel so the emitter knows there is no
    /// destination.
    fn parse_assignment_or_call(&mut self) -> Result<Statement> {
        debug!("parser: assignment or call");
        let var_name = self.current.lexeme.clone();
        self.advance()?;

        if self.current.lexeme == "=" {
            self.advance()?;
            let expr = self.parse_expression()?;
            return Ok(Statement::Assign { var_name, expr });
        }

        if self.current.lexeme == "(" {
            self.advance()?;
            let args = self.parse_call_arguments()?;
            return Ok(Statement::Assign {
                var_name: DISCARD_TARGET.to_string(),
                expr: Expression::Call {
                    callee: var_name,
                    args,
                },
            });
        }

        parse_logic(format!(
            "Expected = or ( parsing assignment or call, got: {}",
            self.current.lexeme
        ))
    }

    /// `fr? <cond> { ... }` and its `ong?` / `justLikeThat?` continuations.
    /// An `ong?` arm recurses here, so else-if chains nest in the else slot.
    fn parse_if(&mut self) -> Result<Statement> {
        debug!("parser: if statement");
        self.advance()?; // past fr? (or ong? when chaining)
        let condition = self.parse_expression()?;
        let (then_branch, _) = self.parse_curly_compound()?;

        let else_branch = match self.current.kind {
            TokenKind::ElseIf => self.parse_if()?,
            TokenKind::Else => {
                self.advance()?;
                self.parse_statement()?
            }
            _ => Statement::Compound(Vec::new()),
        };

        Ok(Statement::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    fn parse_while(&mut self) -> Result<Statement> {
        debug!("parser: while statement");
        self.advance()?; // past holdUp
        let condition = self.parse_expression()?;
        let (body, _) = self.parse_curly_compound()?;
        Ok(Statement::While {
            condition,
            body: Box::new(body),
        })
    }

    fn parse_return(&mut self) -> Result<Statement> {
        debug!("parser: return statement");
        self.advance()?; // past yeet
        let expr = self.parse_expression()?;
        Ok(Statement::Return(expr))
    }

    /// Parse a braced block. The second element of the pair records whether
    /// the block's last statement was a `yeet`, which is all
    /// [`Parser::parse_pluh`] needs for its shallow return check.
    fn parse_curly_compound(&mut self) -> Result<(Statement, bool)> {
        debug!("parser: compound statement");
        if self.current.lexeme != "{" {
            return parse_logic(format!(
                "Expected {{ starting a block, got: {}",
                self.current.lexeme
            ));
        }
        self.advance()?;

        let mut statements = Vec::new();
        while self.current.lexeme != "}" {
            if self.current.kind == TokenKind::EndOfFile {
                return parse_logic("Expected } closing a block");
            }
            statements.push(self.parse_statement()?);
        }

        let ends_with_return = matches!(statements.last(), Some(Statement::Return(_)));
        self.advance()?; // past '}'
        Ok((Statement::Compound(statements), ends_with_return))
    }

    /// `<name> ( <arg> : <type> , ... ) : <return-type>`
    fn parse_prototype(&mut self) -> Result<Prototype> {
        debug!("parser: prototype");
        if self.current.kind != TokenKind::Identifier {
            return parse_logic(format!(
                "Expected identifier in prototype, got: {}",
                self.current.lexeme
            ));
        }
        let name = self.current.lexeme.clone();
        self.advance()?;

        if self.current.lexeme != "(" {
            return parse_logic(format!(
                "Expected ( in prototype, got: {}",
                self.current.lexeme
            ));
        }
        self.advance()?;

        let mut args = Vec::new();
        while self.current.kind == TokenKind::Identifier {
            let arg_name = self.current.lexeme.clone();
            self.advance()?;
            if self.current.lexeme != ":" {
                return parse_logic(format!(
                    "Expected : after argument name in prototype, got: {}",
                    self.current.lexeme
                ));
            }
            self.advance()?;
            if self.current.kind != TokenKind::Identifier {
                return parse_logic(format!(
                    "Expected type name in prototype, got: {}",
                    self.current.lexeme
                ));
            }
            args.push(Argument {
                name: arg_name,
                ty: self.current.lexeme.clone(),
            });
            self.advance()?;
            if self.current.lexeme != "," {
                break;
            }
            self.advance()?;
        }

        if self.current.lexeme != ")" {
            return parse_logic(format!(
                "Expected ) in prototype, got: {}",
                self.current.lexeme
            ));
        }
        self.advance()?;

        if self.current.lexeme != ":" {
            return parse_logic(format!(
                "Expected : after arguments in prototype, got: {}",
                self.current.lexeme
            ));
        }
        self.advance()?;

        if self.current.kind != TokenKind::Identifier {
            return parse_logic(format!(
                "Expected return type in prototype, got: {}",
                self.current.lexeme
            ));
        }
        let return_type = self.current.lexeme.clone();
        self.advance()?;

        Ok(Prototype {
            name,
            args,
            return_type,
        })
    }

    /// `pluh <prototype> { ... }`: a definition. The body must end with a
    /// `yeet` exactly when the declared return type is not `npc`.
    fn parse_pluh(&mut self) -> Result<PluhDeclaration> {
        debug!("parser: function definition");
        self.advance()?; // past pluh
        let prototype = self.parse_prototype()?;
        let (body, ends_with_return) = self.parse_curly_compound()?;

        let returns_value = prototype.return_type != VOID_TYPE;
        if returns_value != ends_with_return {
            return parse_logic(format!(
                "Expected return type {} for pluh: {}",
                prototype.return_type, prototype.name
            ));
        }

        Ok(PluhDeclaration {
            prototype,
            body: Some(body),
        })
    }

    /// `plug <prototype>`: an external declaration without a body.
    fn parse_plug(&mut self) -> Result<PluhDeclaration> {
        debug!("parser: external declaration");
        self.advance()?; // past plug
        let prototype = self.parse_prototype()?;
        Ok(PluhDeclaration {
            prototype,
            body: None,
        })
    }

    fn parse_declarations(&mut self) -> Result<Vec<PluhDeclaration>> {
        let mut declarations = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::Def => declarations.push(self.parse_pluh()?),
                TokenKind::Extern => declarations.push(self.parse_plug()?),
                TokenKind::EndOfFile => return Ok(declarations),
                _ => {
                    return parse_logic(format!(
                        "Expected pluh or plug at top level, got: {}",
                        self.current.lexeme
                    ))
                }
            }
        }
    }

    /// Parse a whole module: `spillingTheTeaAbout <name>` followed by
    /// function definitions and externs until end of input.
    pub fn parse_program(&mut self) -> Result<TeaSpill> {
        debug!("parser: program");
        if self.current.kind != TokenKind::Program {
            return parse_logic(format!(
                "Expected spillingTheTeaAbout opening the program, got: {}",
                self.current.lexeme
            ));
        }
        self.advance()?;

        if self.current.kind != TokenKind::Identifier {
            return parse_logic(format!(
                "Expected module name, got: {}",
                self.current.lexeme
            ));
        }
        let name = self.current.lexeme.clone();
        self.advance()?;

        let declarations = self.parse_declarations()?;
        Ok(TeaSpill { name, declarations })
    }
}

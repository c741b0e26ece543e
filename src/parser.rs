//! Recursive descent parser
//!
//! Precedence-climbing over the scanner's token stream, one production
//! per method, lowest precedence first:
//!
//! ```text
//! program      := commas END
//! commas       := empty | list [ "," ]
//! semicolons   := item (";" item)* [ ";" ]
//! item         := "..." item
//!               | "if" primary item [ "else" item ]
//!               | "for" parens item
//!               | disjunction ( "=" | ":" | "->" | "<<" ) item
//! disjunction  := conjunction ( ("||" | ">>") conjunction )*
//! conjunction  := relation ( "&&" relation )*
//! relation     := range ( relop range )?
//! range        := sum ( (".." | "..<") sum ( "by" sum )? )?
//! sum          := product ( ("+" | "-") product )*
//! product      := unary ( ("*" | "/") unary )*
//! unary        := ("+" | "-" | "!") unary | postfix
//! postfix      := primary ( "^" unary | ("." | "'") primary | primary )*
//! primary      := NUM | IDENT | STRING | parens | list | braces
//!               | "let" parens item
//! ```
//!
//! Juxtaposition at the postfix level is a left-associative call. Every
//! produced phrase carries a location spanning its first to last
//! consumed token.

use crate::atom::AtomTable;
use crate::error::{Error, Result};
use crate::phrase::{DelimitedPhrase, Phrase, PhraseArg};
use crate::scanner::Scanner;
use crate::source::Location;
use crate::token::{Token, TokenKind};
use std::rc::Rc;

/// Parse a whole script into a `Program` phrase
pub fn parse_program(scanner: Scanner) -> Result<Rc<Phrase>> {
    Parser::new(scanner).program()
}

fn is_list_end_token(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::End | TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace
    )
}

fn is_semicolon_end_token(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::End
            | TokenKind::Comma
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
    )
}

pub struct Parser {
    scanner: Scanner,
    atoms: AtomTable,
}

impl Parser {
    pub fn new(scanner: Scanner) -> Self {
        Parser {
            scanner,
            atoms: AtomTable::new(),
        }
    }

    fn token_loc(&self, tok: Token) -> Location {
        Location::new(self.scanner.script().clone(), tok)
    }

    /// program := commas END
    pub fn program(&mut self) -> Result<Rc<Phrase>> {
        log::debug!("parsing program '{}'", self.scanner.script().name);
        let body = self.commas()?;
        let tok = self.scanner.get_token()?;
        if tok.kind != TokenKind::End {
            return Err(Error::syntax("syntax error in program", self.token_loc(tok)));
        }
        let location = body.location().ending_at(tok);
        Ok(Rc::new(Phrase::Program {
            body,
            end: tok,
            location,
        }))
    }

    /// commas := empty | list | list ","
    /// list := semicolons | list "," semicolons
    ///
    /// A list of exactly one element with no trailing comma is returned
    /// as the element itself. An empty context (next token is a closing
    /// delimiter or END) yields a zero-width `Empty` phrase.
    fn commas(&mut self) -> Result<Rc<Phrase>> {
        let tok = self.scanner.get_token()?;
        self.scanner.push_token(tok);
        if is_list_end_token(tok.kind) {
            let mut begin = tok;
            begin.last = begin.first;
            return Ok(Rc::new(Phrase::Empty(self.token_loc(begin))));
        }
        let mut args: Vec<PhraseArg> = Vec::new();
        loop {
            let semis = self.semicolons()?;
            let tok = self.scanner.get_token()?;
            if tok.kind == TokenKind::Comma {
                args.push(PhraseArg {
                    expr: semis,
                    separator: tok,
                });
                let tok2 = self.scanner.get_token()?;
                self.scanner.push_token(tok2);
                if is_list_end_token(tok2.kind) {
                    return Ok(self.commas_phrase(args));
                }
            } else if is_list_end_token(tok.kind) {
                self.scanner.push_token(tok);
                if args.is_empty() {
                    return Ok(semis);
                }
                args.push(PhraseArg {
                    expr: semis,
                    separator: Token::default(),
                });
                return Ok(self.commas_phrase(args));
            } else {
                return Err(Error::syntax(
                    "syntax error in comma phrase",
                    self.token_loc(tok),
                ));
            }
        }
    }

    /// semicolons := item (";" item)* [ ";" ]
    ///
    /// A single item with no semicolon is returned as the item itself;
    /// a trailing semicolon is recorded as the last item's separator.
    fn semicolons(&mut self) -> Result<Rc<Phrase>> {
        let mut args: Vec<PhraseArg> = Vec::new();
        loop {
            let item = self.item()?;
            let tok = self.scanner.get_token()?;
            if tok.kind == TokenKind::Semicolon {
                args.push(PhraseArg {
                    expr: item,
                    separator: tok,
                });
                let tok2 = self.scanner.get_token()?;
                self.scanner.push_token(tok2);
                if is_semicolon_end_token(tok2.kind) {
                    return Ok(self.semicolons_phrase(args));
                }
            } else if is_semicolon_end_token(tok.kind) {
                self.scanner.push_token(tok);
                if args.is_empty() {
                    return Ok(item);
                }
                args.push(PhraseArg {
                    expr: item,
                    separator: Token::default(),
                });
                return Ok(self.semicolons_phrase(args));
            } else {
                return Err(Error::syntax(
                    "syntax error in semicolon phrase",
                    self.token_loc(tok),
                ));
            }
        }
    }

    fn commas_phrase(&self, args: Vec<PhraseArg>) -> Rc<Phrase> {
        let location = self.args_location(&args);
        Rc::new(Phrase::Commas { args, location })
    }

    fn semicolons_phrase(&self, args: Vec<PhraseArg>) -> Rc<Phrase> {
        let location = self.args_location(&args);
        Rc::new(Phrase::Semicolons { args, location })
    }

    fn args_location(&self, args: &[PhraseArg]) -> Location {
        debug_assert!(!args.is_empty());
        let first = args[0].expr.location();
        match args.last() {
            Some(last) if !last.separator.is_missing() => first.ending_at(last.separator),
            Some(last) => first.ending_at(last.expr.location().token()),
            None => first.clone(),
        }
    }

    /// Low precedence right-associative operators, plus `if`/`for`
    fn item(&mut self) -> Result<Rc<Phrase>> {
        let tok = self.scanner.get_token()?;
        match tok.kind {
            TokenKind::Ellipsis => {
                let arg = self.item()?;
                let location = self.token_loc(tok).ending_at(arg.location().token());
                return Ok(Rc::new(Phrase::Unary {
                    op: tok,
                    arg,
                    location,
                }));
            }
            TokenKind::If => {
                let cond = self.primary_required("condition following 'if'")?;
                let then = self.item()?;
                let tok2 = self.scanner.get_token()?;
                if tok2.kind != TokenKind::Else {
                    self.scanner.push_token(tok2);
                    let location = self.token_loc(tok).ending_at(then.location().token());
                    return Ok(Rc::new(Phrase::If {
                        cond,
                        then,
                        otherwise: None,
                        location,
                    }));
                }
                // dangling else binds to the nearest unmatched if
                let otherwise = self.item()?;
                let location = self.token_loc(tok).ending_at(otherwise.location().token());
                return Ok(Rc::new(Phrase::If {
                    cond,
                    then,
                    otherwise: Some(otherwise),
                    location,
                }));
            }
            TokenKind::For => {
                let args = self.primary_required("argument following 'for'")?;
                if args.as_paren().is_none() {
                    return Err(Error::malformed_argument("for", args.location().clone()));
                }
                let body = self.item()?;
                let location = self.token_loc(tok).ending_at(body.location().token());
                return Ok(Rc::new(Phrase::For {
                    args,
                    body,
                    location,
                }));
            }
            _ => {}
        }

        self.scanner.push_token(tok);
        let left = self.disjunction()?;
        let tok = self.scanner.get_token()?;
        match tok.kind {
            TokenKind::Equate => {
                let right = self.item()?;
                let location = left.location().ending_at(right.location().token());
                Ok(Rc::new(Phrase::Definition {
                    left,
                    right,
                    location,
                }))
            }
            TokenKind::Colon => {
                let right = self.item()?;
                let location = left.location().ending_at(right.location().token());
                Ok(Rc::new(Phrase::Binary {
                    left,
                    op: tok,
                    right,
                    location,
                }))
            }
            TokenKind::RightArrow => {
                let right = self.item()?;
                let location = left.location().ending_at(right.location().token());
                Ok(Rc::new(Phrase::Lambda {
                    left,
                    right,
                    location,
                }))
            }
            TokenKind::LeftCall => {
                let args = self.item()?;
                let location = left.location().ending_at(args.location().token());
                Ok(Rc::new(Phrase::Call {
                    function: left,
                    args,
                    call_tok: tok,
                    location,
                }))
            }
            _ => {
                self.scanner.push_token(tok);
                Ok(left)
            }
        }
    }

    /// disjunction := conjunction ( ("||" | ">>") conjunction )*
    ///
    /// `a >> f` is a reverse call: `f` applied to `a`.
    fn disjunction(&mut self) -> Result<Rc<Phrase>> {
        let mut left = self.conjunction()?;
        loop {
            let tok = self.scanner.get_token()?;
            match tok.kind {
                TokenKind::Or => {
                    let right = self.conjunction()?;
                    let location = left.location().ending_at(right.location().token());
                    left = Rc::new(Phrase::Binary {
                        left,
                        op: tok,
                        right,
                        location,
                    });
                }
                TokenKind::RightCall => {
                    let function = self.conjunction()?;
                    let location = left.location().ending_at(function.location().token());
                    left = Rc::new(Phrase::Call {
                        function,
                        args: left,
                        call_tok: tok,
                        location,
                    });
                }
                _ => {
                    self.scanner.push_token(tok);
                    return Ok(left);
                }
            }
        }
    }

    /// conjunction := relation ( "&&" relation )*
    fn conjunction(&mut self) -> Result<Rc<Phrase>> {
        let mut left = self.relation()?;
        loop {
            let tok = self.scanner.get_token()?;
            match tok.kind {
                TokenKind::And => {
                    let right = self.relation()?;
                    let location = left.location().ending_at(right.location().token());
                    left = Rc::new(Phrase::Binary {
                        left,
                        op: tok,
                        right,
                        location,
                    });
                }
                _ => {
                    self.scanner.push_token(tok);
                    return Ok(left);
                }
            }
        }
    }

    /// relation := range ( relop range )? ; comparisons do not chain
    fn relation(&mut self) -> Result<Rc<Phrase>> {
        let left = self.range()?;
        let tok = self.scanner.get_token()?;
        match tok.kind {
            TokenKind::Equal
            | TokenKind::NotEqual
            | TokenKind::Less
            | TokenKind::LessOrEqual
            | TokenKind::Greater
            | TokenKind::GreaterOrEqual => {
                let right = self.range()?;
                let location = left.location().ending_at(right.location().token());
                Ok(Rc::new(Phrase::Binary {
                    left,
                    op: tok,
                    right,
                    location,
                }))
            }
            _ => {
                self.scanner.push_token(tok);
                Ok(left)
            }
        }
    }

    /// range := sum ( (".." | "..<") sum ( "by" sum )? )?
    fn range(&mut self) -> Result<Rc<Phrase>> {
        let first = self.sum()?;
        let tok = self.scanner.get_token()?;
        match tok.kind {
            TokenKind::Range | TokenKind::OpenRange => {
                let last = self.sum()?;
                let tok2 = self.scanner.get_token()?;
                let step = if tok2.kind == TokenKind::By {
                    Some(self.sum()?)
                } else {
                    self.scanner.push_token(tok2);
                    None
                };
                let end_tok = match &step {
                    Some(step) => step.location().token(),
                    None => last.location().token(),
                };
                let location = first.location().ending_at(end_tok);
                Ok(Rc::new(Phrase::Range {
                    first,
                    op: tok,
                    last,
                    step,
                    location,
                }))
            }
            _ => {
                self.scanner.push_token(tok);
                Ok(first)
            }
        }
    }

    /// sum := product ( ("+" | "-") product )*
    fn sum(&mut self) -> Result<Rc<Phrase>> {
        let mut left = self.product()?;
        loop {
            let tok = self.scanner.get_token()?;
            match tok.kind {
                TokenKind::Plus | TokenKind::Minus => {
                    let right = self.product()?;
                    let location = left.location().ending_at(right.location().token());
                    left = Rc::new(Phrase::Binary {
                        left,
                        op: tok,
                        right,
                        location,
                    });
                }
                _ => {
                    self.scanner.push_token(tok);
                    return Ok(left);
                }
            }
        }
    }

    /// product := unary ( ("*" | "/") unary )*
    fn product(&mut self) -> Result<Rc<Phrase>> {
        let mut left = self.unary()?;
        loop {
            let tok = self.scanner.get_token()?;
            match tok.kind {
                TokenKind::Times | TokenKind::Over => {
                    let right = self.unary()?;
                    let location = left.location().ending_at(right.location().token());
                    left = Rc::new(Phrase::Binary {
                        left,
                        op: tok,
                        right,
                        location,
                    });
                }
                _ => {
                    self.scanner.push_token(tok);
                    return Ok(left);
                }
            }
        }
    }

    /// unary := ("+" | "-" | "!") unary | postfix
    fn unary(&mut self) -> Result<Rc<Phrase>> {
        let tok = self.scanner.get_token()?;
        match tok.kind {
            TokenKind::Plus | TokenKind::Minus | TokenKind::Not => {
                let arg = self.unary()?;
                let location = self.token_loc(tok).ending_at(arg.location().token());
                Ok(Rc::new(Phrase::Unary {
                    op: tok,
                    arg,
                    location,
                }))
            }
            _ => {
                self.scanner.push_token(tok);
                self.postfix()
            }
        }
    }

    /// postfix := primary ( "^" unary | ("." | "'") primary | primary )*
    ///
    /// An adjacent primary is a juxtaposition call. The optional primary
    /// probe returns absence rather than raising, which terminates the
    /// loop.
    fn postfix(&mut self) -> Result<Rc<Phrase>> {
        let mut postfix = self.primary_required("expression")?;
        loop {
            let tok = self.scanner.get_token()?;
            match tok.kind {
                TokenKind::Power => {
                    let right = self.unary()?;
                    let location = postfix.location().ending_at(right.location().token());
                    return Ok(Rc::new(Phrase::Binary {
                        left: postfix,
                        op: tok,
                        right,
                        location,
                    }));
                }
                TokenKind::Dot | TokenKind::Apostrophe => {
                    let what = if tok.kind == TokenKind::Dot {
                        "expression following ."
                    } else {
                        "expression following '"
                    };
                    let right = self.primary_required(what)?;
                    let location = postfix.location().ending_at(right.location().token());
                    postfix = Rc::new(Phrase::Binary {
                        left: postfix,
                        op: tok,
                        right,
                        location,
                    });
                }
                _ => {
                    self.scanner.push_token(tok);
                    match self.primary_optional()? {
                        None => return Ok(postfix),
                        Some(primary) => {
                            let location =
                                postfix.location().ending_at(primary.location().token());
                            postfix = Rc::new(Phrase::Call {
                                function: postfix,
                                args: primary,
                                call_tok: Token::default(),
                                location,
                            });
                        }
                    }
                }
            }
        }
    }

    fn primary_required(&mut self, what: &str) -> Result<Rc<Phrase>> {
        match self.primary(Some(what))? {
            Some(primary) => Ok(primary),
            None => unreachable!("primary raises when given an expectation"),
        }
    }

    fn primary_optional(&mut self) -> Result<Option<Rc<Phrase>>> {
        self.primary(None)
    }

    /// primary := NUM | IDENT | STRING | parens | list | braces
    ///          | "let" parens item
    ///
    /// With `what` absent this parses an optional primary and returns
    /// `None` (pushing the token back) when none is found; otherwise a
    /// missing primary raises, naming what was expected.
    fn primary(&mut self, what: Option<&str>) -> Result<Option<Rc<Phrase>>> {
        let tok = self.scanner.get_token()?;
        match tok.kind {
            TokenKind::Num => Ok(Some(Rc::new(Phrase::Numeral(self.token_loc(tok))))),
            TokenKind::Ident => {
                let location = self.token_loc(tok);
                let atom = self.atoms.intern(location.range());
                Ok(Some(Rc::new(Phrase::Identifier { atom, location })))
            }
            TokenKind::String => Ok(Some(Rc::new(Phrase::StringLit(self.token_loc(tok))))),
            TokenKind::Let => {
                let args = self.primary_required("argument following 'let'")?;
                if args.as_paren().is_none() {
                    return Err(Error::malformed_argument("let", args.location().clone()));
                }
                let body = self.item()?;
                let location = self.token_loc(tok).ending_at(body.location().token());
                Ok(Some(Rc::new(Phrase::Let {
                    args,
                    body,
                    location,
                })))
            }
            TokenKind::LParen => Ok(Some(self.delimited(tok, TokenKind::RParen)?)),
            TokenKind::LBracket => Ok(Some(self.delimited(tok, TokenKind::RBracket)?)),
            TokenKind::LBrace => Ok(Some(self.delimited(tok, TokenKind::RBrace)?)),
            TokenKind::End => match what {
                Some(what) => Err(Error::syntax(
                    format!("missing {}", what),
                    self.token_loc(tok),
                )),
                None => {
                    self.scanner.push_token(tok);
                    Ok(None)
                }
            },
            _ => match what {
                Some(what) => Err(Error::syntax(
                    format!("unexpected token when expecting {}", what),
                    self.token_loc(tok),
                )),
                None => {
                    self.scanner.push_token(tok);
                    Ok(None)
                }
            },
        }
    }

    /// parens | list | braces: a delimited commas body.
    ///
    /// An unclosed delimiter is attributed to the opener's location.
    fn delimited(&mut self, open: Token, close: TokenKind) -> Result<Rc<Phrase>> {
        let body = self.commas()?;
        let tok2 = self.scanner.get_token()?;
        if tok2.kind == TokenKind::End {
            return Err(Error::syntax("unmatched delimiter", self.token_loc(open)));
        }
        if tok2.kind != close {
            return Err(Error::syntax(
                "syntax error in delimited phrase",
                self.token_loc(tok2),
            ));
        }
        let args = flatten_list_body(&body);
        let location = self.token_loc(open).ending_at(tok2);
        let delimited = DelimitedPhrase {
            open,
            args,
            close: tok2,
            location,
        };
        Ok(Rc::new(match open.kind {
            TokenKind::LParen => Phrase::Paren(delimited),
            TokenKind::LBracket => Phrase::Bracket(delimited),
            _ => Phrase::Brace(delimited),
        }))
    }
}

/// Flatten a commas body into the `{expr, separator}` element list of a
/// delimited phrase
fn flatten_list_body(body: &Rc<Phrase>) -> Vec<PhraseArg> {
    match &**body {
        Phrase::Empty(_) => Vec::new(),
        Phrase::Commas { args, .. } => args.clone(),
        _ => vec![PhraseArg {
            expr: body.clone(),
            separator: Token::default(),
        }],
    }
}

// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the trajan selection language.

use regex::Regex;

use crate::errors::SelectError;
use crate::selections::numbers;
use crate::structures::frame::Frame;
use crate::topology::bonds::BondGraph;

/// A name pattern: either a literal string or a regular expression
/// written as `r'...'` in the query.
#[derive(Debug, Clone)]
pub enum NamePattern {
    Literal(String),
    Regex(Regex),
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NamePattern::Literal(a), NamePattern::Literal(b)) => a == b,
            (NamePattern::Regex(a), NamePattern::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl NamePattern {
    fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Literal(literal) => literal == name,
            NamePattern::Regex(regex) => regex.is_match(name),
        }
    }
}

/// Compiled selection expression tree.
///
/// Roles (0-based internally; written `#1`, `#2`, `#3` in queries) bind a
/// predicate to one member of the matched tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum Select {
    All,
    Name(Vec<NamePattern>),
    Element(Vec<String>),
    Index(Vec<(usize, usize)>),
    /// Relation: the atoms in the two roles are bonded to each other.
    Bonded(usize, usize),
    And(Box<Select>, Box<Select>),
    Or(Box<Select>, Box<Select>),
    Not(Box<Select>),
    /// Predicate bound to a tuple role.
    Role(usize, Box<Select>),
}

#[derive(Debug, PartialEq)]
enum Operator {
    And,
    Or,
    Not,
}

/// A selection expression compiled for a fixed tuple arity (1, 2, or 3).
///
/// Compilation fails on malformed queries before any frame is read.
/// Evaluation is pure and recomputed fresh for every frame, so predicates
/// referencing the per-frame bond topology stay correct when bonds break
/// and reform between frames.
#[derive(Debug, Clone)]
pub struct CompiledSelection {
    arity: usize,
    tree: Box<Select>,
    query: String,
}

impl CompiledSelection {
    /// Compile a selection query for the given tuple arity.
    ///
    /// ## Returns
    /// `SelectError` describing the problem if the query is malformed, uses
    /// an unknown keyword, or its header (`atoms:`, `pairs:`, `angles:`)
    /// does not match the requested arity.
    ///
    /// ## Example
    /// ```
    /// # use trajan_rs::prelude::*;
    /// #
    /// let selection = CompiledSelection::compile("pairs: name(#1) O and name(#2) H", 2).unwrap();
    /// assert_eq!(selection.arity(), 2);
    /// ```
    pub fn compile(query: &str, arity: usize) -> Result<Self, SelectError> {
        if !(1..=3).contains(&arity) {
            return Err(SelectError::InvalidArity(arity));
        }

        let body = strip_header(query, arity)?;
        let tree = parse_query(body)?;
        validate_roles(&tree, arity, query)?;

        Ok(CompiledSelection {
            arity,
            tree,
            query: query.to_string(),
        })
    }

    /// Get the arity of the selection.
    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Get the original query string.
    #[inline]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Evaluate a single-atom selection, returning matched atom indices in
    /// ascending order.
    ///
    /// ## Panics
    /// Panics if the selection was compiled with an arity other than 1.
    pub fn evaluate_atoms(&self, frame: &Frame) -> Result<Vec<usize>, SelectError> {
        if self.arity != 1 {
            panic!("FATAL TRAJAN ERROR | CompiledSelection::evaluate_atoms | Selection has arity {}.", self.arity);
        }

        let masks = MaskTree::build(&self.tree, frame)?;

        Ok((0..frame.n_atoms())
            .filter(|&a| masks.eval(&[a], frame.bonds()))
            .collect())
    }

    /// Evaluate a pair selection, returning matched ordered index pairs in
    /// lexicographic order. The two members of a pair are always distinct.
    ///
    /// ## Panics
    /// Panics if the selection was compiled with an arity other than 2.
    pub fn evaluate_pairs(&self, frame: &Frame) -> Result<Vec<(usize, usize)>, SelectError> {
        if self.arity != 2 {
            panic!("FATAL TRAJAN ERROR | CompiledSelection::evaluate_pairs | Selection has arity {}.", self.arity);
        }

        let masks = MaskTree::build(&self.tree, frame)?;
        let candidates = masks.candidates(self.arity, frame.n_atoms());

        let mut pairs = Vec::new();
        for &i in &candidates[0] {
            for &j in &candidates[1] {
                if i != j && masks.eval(&[i, j], frame.bonds()) {
                    pairs.push((i, j));
                }
            }
        }

        Ok(pairs)
    }

    /// Evaluate a triple selection, returning matched ordered index triples
    /// in lexicographic order. All members of a triple are distinct.
    ///
    /// ## Panics
    /// Panics if the selection was compiled with an arity other than 3.
    pub fn evaluate_triples(
        &self,
        frame: &Frame,
    ) -> Result<Vec<(usize, usize, usize)>, SelectError> {
        if self.arity != 3 {
            panic!("FATAL TRAJAN ERROR | CompiledSelection::evaluate_triples | Selection has arity {}.", self.arity);
        }

        let masks = MaskTree::build(&self.tree, frame)?;
        let candidates = masks.candidates(self.arity, frame.n_atoms());

        let mut triples = Vec::new();
        for &i in &candidates[0] {
            for &j in &candidates[1] {
                if i == j {
                    continue;
                }
                for &k in &candidates[2] {
                    if k != i && k != j && masks.eval(&[i, j, k], frame.bonds()) {
                        triples.push((i, j, k));
                    }
                }
            }
        }

        Ok(triples)
    }
}

/// Strip the `atoms:`/`pairs:`/`angles:` header from a query and check it
/// against the requested arity.
fn strip_header(query: &str, arity: usize) -> Result<&str, SelectError> {
    let trimmed = query.trim_start();

    for (header, header_arity) in [("atoms:", 1), ("pairs:", 2), ("angles:", 3)] {
        if let Some(body) = trimmed.strip_prefix(header) {
            if header_arity != arity {
                return Err(SelectError::ArityMismatch {
                    query: query.to_string(),
                    expected: arity,
                    found: header_arity,
                });
            }
            return Ok(body);
        }
    }

    Ok(trimmed)
}

/// Check that role bindings are consistent with the selection arity:
/// roles must exist, and in multi-atom selections every leaf predicate
/// except `all` must be bound to a role.
fn validate_roles(tree: &Select, arity: usize, query: &str) -> Result<(), SelectError> {
    match tree {
        Select::All => Ok(()),
        Select::Name(_) | Select::Element(_) | Select::Index(_) => {
            if arity > 1 {
                Err(SelectError::MissingRole(query.to_string()))
            } else {
                Ok(())
            }
        }
        Select::Bonded(i, j) => {
            if *i >= arity || *j >= arity {
                Err(SelectError::InvalidRole(query.to_string()))
            } else {
                Ok(())
            }
        }
        Select::Role(role, inner) => {
            if arity == 1 || *role >= arity {
                return Err(SelectError::InvalidRole(query.to_string()));
            }
            // a role wraps a plain leaf; nested roles are not produced by the parser
            match **inner {
                Select::Name(_) | Select::Element(_) | Select::Index(_) => Ok(()),
                _ => panic!(
                    "FATAL TRAJAN ERROR | select::validate_roles | Role wraps a non-leaf node."
                ),
            }
        }
        Select::And(left, right) | Select::Or(left, right) => {
            validate_roles(left, arity, query)?;
            validate_roles(right, arity, query)
        }
        Select::Not(inner) => validate_roles(inner, arity, query),
    }
}

/**************************/
/*  EVALUATION MACHINERY  */
/**************************/

/// Three-valued logic used for per-role candidate pruning: when evaluating
/// candidates for one role, predicates bound to other roles are unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Tri {
    True,
    False,
    Unknown,
}

/// Expression tree with leaf predicates pre-evaluated into per-atom masks
/// for one frame.
enum MaskTree {
    True,
    Mask(Vec<bool>),
    RoleMask(usize, Vec<bool>),
    Bonded(usize, usize),
    And(Box<MaskTree>, Box<MaskTree>),
    Or(Box<MaskTree>, Box<MaskTree>),
    Not(Box<MaskTree>),
}

impl MaskTree {
    /// Evaluate all leaf predicates of the selection tree against a frame.
    fn build(tree: &Select, frame: &Frame) -> Result<MaskTree, SelectError> {
        match tree {
            Select::All => Ok(MaskTree::True),
            Select::Name(_) | Select::Element(_) | Select::Index(_) => {
                Ok(MaskTree::Mask(leaf_mask(tree, frame)))
            }
            Select::Role(role, inner) => Ok(MaskTree::RoleMask(*role, leaf_mask(inner, frame))),
            Select::Bonded(i, j) => {
                if frame.bonds().is_none() {
                    return Err(SelectError::MissingBonds);
                }
                Ok(MaskTree::Bonded(*i, *j))
            }
            Select::And(left, right) => Ok(MaskTree::And(
                Box::new(MaskTree::build(left, frame)?),
                Box::new(MaskTree::build(right, frame)?),
            )),
            Select::Or(left, right) => Ok(MaskTree::Or(
                Box::new(MaskTree::build(left, frame)?),
                Box::new(MaskTree::build(right, frame)?),
            )),
            Select::Not(inner) => Ok(MaskTree::Not(Box::new(MaskTree::build(inner, frame)?))),
        }
    }

    /// Fully evaluate the tree for a concrete tuple of atom indices.
    fn eval(&self, tuple: &[usize], bonds: Option<&BondGraph>) -> bool {
        match self {
            MaskTree::True => true,
            MaskTree::Mask(mask) => mask[tuple[0]],
            MaskTree::RoleMask(role, mask) => mask[tuple[*role]],
            MaskTree::Bonded(i, j) => bonds
                .expect("FATAL TRAJAN ERROR | MaskTree::eval | Bonds checked during build.")
                .contains(tuple[*i], tuple[*j]),
            MaskTree::And(left, right) => left.eval(tuple, bonds) && right.eval(tuple, bonds),
            MaskTree::Or(left, right) => left.eval(tuple, bonds) || right.eval(tuple, bonds),
            MaskTree::Not(inner) => !inner.eval(tuple, bonds),
        }
    }

    /// Evaluate the tree for a single atom placed in a single role with all
    /// other roles unknown (Kleene logic).
    fn eval_tri(&self, role: usize, atom: usize) -> Tri {
        match self {
            MaskTree::True => Tri::True,
            MaskTree::Mask(mask) => {
                if mask[atom] {
                    Tri::True
                } else {
                    Tri::False
                }
            }
            MaskTree::RoleMask(mask_role, mask) => {
                if *mask_role != role {
                    Tri::Unknown
                } else if mask[atom] {
                    Tri::True
                } else {
                    Tri::False
                }
            }
            MaskTree::Bonded(_, _) => Tri::Unknown,
            MaskTree::And(left, right) => {
                match (left.eval_tri(role, atom), right.eval_tri(role, atom)) {
                    (Tri::False, _) | (_, Tri::False) => Tri::False,
                    (Tri::Unknown, _) | (_, Tri::Unknown) => Tri::Unknown,
                    _ => Tri::True,
                }
            }
            MaskTree::Or(left, right) => {
                match (left.eval_tri(role, atom), right.eval_tri(role, atom)) {
                    (Tri::True, _) | (_, Tri::True) => Tri::True,
                    (Tri::Unknown, _) | (_, Tri::Unknown) => Tri::Unknown,
                    _ => Tri::False,
                }
            }
            MaskTree::Not(inner) => match inner.eval_tri(role, atom) {
                Tri::True => Tri::False,
                Tri::False => Tri::True,
                Tri::Unknown => Tri::Unknown,
            },
        }
    }

    /// Compute per-role candidate lists: atoms for which the tree does not
    /// evaluate to a definite `false` when placed in the role. Sound pruning:
    /// no valid tuple member is ever excluded.
    fn candidates(&self, arity: usize, n_atoms: usize) -> Vec<Vec<usize>> {
        (0..arity)
            .map(|role| {
                (0..n_atoms)
                    .filter(|&atom| self.eval_tri(role, atom) != Tri::False)
                    .collect()
            })
            .collect()
    }
}

/// Evaluate a leaf predicate for every atom of a frame.
fn leaf_mask(leaf: &Select, frame: &Frame) -> Vec<bool> {
    match leaf {
        Select::Name(patterns) => frame
            .atoms()
            .iter()
            .map(|atom| patterns.iter().any(|p| p.matches(atom.name())))
            .collect(),
        Select::Element(symbols) => frame
            .atoms()
            .iter()
            .map(|atom| match atom.element() {
                Some(element) => symbols.iter().any(|s| s == element),
                None => false,
            })
            .collect(),
        Select::Index(ranges) => (0..frame.n_atoms())
            .map(|i| ranges.iter().any(|&(start, end)| i >= start && i <= end))
            .collect(),
        _ => panic!("FATAL TRAJAN ERROR | select::leaf_mask | Node is not a leaf predicate."),
    }
}

/*************/
/*  PARSING  */
/*************/

/// Parse a selection query into an expression tree.
pub fn parse_query(query: &str) -> Result<Box<Select>, SelectError> {
    // check that the expression is not empty
    if query.trim().is_empty() {
        return Err(SelectError::EmptyQuery);
    }

    // check that number of '(' is balanced with the number of ')'
    if !par_balanced(query) {
        return Err(SelectError::InvalidParentheses(query.to_string()));
    }

    // check that the number of quotes is even, i.e. all quote-blocks are closed
    if !quotes_balanced(query) {
        return Err(SelectError::InvalidQuotes(query.to_string()));
    }

    // replace word operators with their symbolic equivalents
    let expression = replace_keywords(query);

    match parse_subquery(&expression, 0, expression.chars().count()) {
        Ok(x) => Ok(x),
        Err(SelectError::InvalidOperator(_)) => {
            Err(SelectError::InvalidOperator(query.to_string()))
        }
        Err(SelectError::MissingArgument(_)) => {
            Err(SelectError::MissingArgument(query.to_string()))
        }
        Err(SelectError::EmptyArgument(_)) => Err(SelectError::EmptyArgument(query.to_string())),
        Err(e) => Err(e),
    }
}

fn parse_subquery(expression: &str, start: usize, end: usize) -> Result<Box<Select>, SelectError> {
    let mut tree: Option<Box<Select>> = None;

    let mut i = start;

    let mut token = String::new();
    let mut unary_operators: Vec<Operator> = Vec::new();
    let mut binary_operator: Option<Operator> = None;

    while i < end {
        let c = expression.chars().nth(i).unwrap();

        match c {
            '(' => {
                // a role annotation `(#...)` belongs to the current token
                if expression.chars().nth(i + 1) == Some('#') {
                    while let Some(annotation) = expression.chars().nth(i) {
                        token.push(annotation);
                        i += 1;
                        if annotation == ')' {
                            break;
                        }
                    }
                    continue;
                }

                let new_end = match find_parenthesis(expression, i, end) {
                    Some(x) => x,
                    None => {
                        panic!("FATAL TRAJAN ERROR | select::parse_subquery | Parentheses should be balanced but they are not.")
                    }
                };

                let parsed = parse_subquery(expression, i + 1, new_end)?;
                tree = process_operation(tree, parsed, &mut unary_operators, &binary_operator)?;

                binary_operator = None;

                i = new_end + 1;
            }

            ')' => i += 1,

            // binary operators
            '&' | '|' => {
                let operator = find_operator(expression, c, i);
                // unknown operator
                if operator.is_none() {
                    return Err(SelectError::InvalidOperator("".to_string()));
                }

                if !token.trim().is_empty() {
                    // parse the token and process the queued operations
                    let parsed = Box::from(parse_token(&token)?);
                    tree = process_operation(tree, parsed, &mut unary_operators, &binary_operator)?;
                    token.clear();
                }

                // set the new binary operator
                binary_operator = operator;
                i += 2;
            }

            // NOT operator
            '!' => {
                unary_operators.push(Operator::Not);
                i += 1;
            }

            _ => {
                token.push(c);
                i += 1;
            }
        }
    }

    // process the last operation
    if !token.trim().is_empty() {
        let parsed = Box::from(parse_token(&token)?);
        tree = process_operation(tree, parsed, &mut unary_operators, &binary_operator)?;
    } else if binary_operator.is_some() {
        return Err(SelectError::MissingArgument("".to_string()));
    }

    match tree {
        Some(x) => Ok(x),
        None => Err(SelectError::MissingArgument("".to_string())),
    }
}

fn process_operation(
    tree: Option<Box<Select>>,
    mut parsed: Box<Select>,
    unary: &mut Vec<Operator>,
    binary: &Option<Operator>,
) -> Result<Option<Box<Select>>, SelectError> {
    // modify the parsed token using unary operators
    for _ in unary.iter() {
        parsed = Box::from(Select::Not(parsed));
    }
    unary.clear();

    // apply the previous binary operator
    if let Some(op) = binary {
        if let Some(t) = tree {
            match op {
                Operator::And => Ok(Some(Box::from(Select::And(t, parsed)))),
                Operator::Or => Ok(Some(Box::from(Select::Or(t, parsed)))),
                Operator::Not => panic!(
                    "FATAL TRAJAN ERROR | select::process_operation | Somehow, NOT operator is being treated as binary operator."
                ),
            }
        } else {
            Err(SelectError::MissingArgument("".to_string()))
        }
    // or create a new tree
    } else {
        if tree.is_some() {
            panic!("FATAL TRAJAN ERROR | select::process_operation | No binary operator detected but the tree already exists.")
        }
        Ok(Some(parsed))
    }
}

fn find_operator(string: &str, op_symbol: char, start: usize) -> Option<Operator> {
    if string.chars().nth(start + 1) == Some(op_symbol) {
        match op_symbol {
            '&' => Some(Operator::And),
            '|' => Some(Operator::Or),
            _ => None,
        }
    } else {
        None
    }
}

/// Check whether the number of '(' and ')' matches each other.
fn par_balanced(string: &str) -> bool {
    string.chars().fold(0, |acc, c| {
        if c == '(' {
            acc + 1
        } else if c == ')' {
            acc - 1
        } else {
            acc
        }
    }) == 0
}

/// Check whether the number of quote characters is even.
fn quotes_balanced(string: &str) -> bool {
    let single = string.chars().filter(|&c| c == '\'').count();
    let double = string.chars().filter(|&c| c == '"').count();

    single % 2 == 0 && double % 2 == 0
}

fn find_parenthesis(query: &str, start: usize, end: usize) -> Option<usize> {
    let mut open = 0;
    let mut closed = 0;

    for (index, c) in query.chars().enumerate().skip(start) {
        if c == '(' {
            open += 1;
        } else if c == ')' {
            closed += 1;
            if open == closed {
                return Some(index);
            }
        }

        if index > end {
            return None;
        }
    }

    None
}

/// Replace alphabetical keywords with their symbolic representations.
/// Ignores quote blocks.
fn replace_keywords(input: &str) -> String {
    let mut result = String::new();
    let mut input_chars = input.chars().peekable();
    let mut inside_quotes = false;

    while let Some(c) = input_chars.next() {
        if c == '\'' || c == '"' {
            inside_quotes = !inside_quotes;
            result.push(c);
            continue;
        }

        if inside_quotes {
            result.push(c);
            continue;
        }

        if c.is_alphabetic() {
            let keyword = get_keyword(&mut input_chars, c);
            let replaced_keyword = match keyword.as_str() {
                "and" => "&&",
                "or" => "||",
                "not" => "!",
                "to" => "-",
                _ => keyword.as_str(),
            };
            result.push_str(replaced_keyword);
        } else {
            result.push(c);
        }
    }

    result
}

fn get_keyword<I: Iterator<Item = char>>(
    iter: &mut std::iter::Peekable<I>,
    first_char: char,
) -> String {
    let mut keyword = String::new();
    keyword.push(first_char);

    while let Some(&c) = iter.peek() {
        if c.is_alphabetic() {
            keyword.push(iter.next().unwrap());
        } else {
            break;
        }
    }

    keyword
}

/// Split a string by whitespace while keeping quote-blocks together.
/// Quote characters are retained so regex blocks stay recognizable.
fn split_with_quotes(string: &str) -> Vec<String> {
    let mut result = vec![String::new()];
    let mut inside = false;
    let mut block = 0;

    for c in string.chars() {
        if c == '\'' || c == '"' {
            inside = !inside;
            result[block].push(c);
            continue;
        }

        if c.is_whitespace() && !inside {
            result.push(String::new());
            block += 1;
            continue;
        }

        result[block].push(c);
    }

    result
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a keyword optionally carrying a role annotation,
/// e.g. `name(#1)` or `bonded(#1,#2)`.
fn parse_keyword(word: &str) -> Result<(String, Vec<usize>), SelectError> {
    let Some(open) = word.find('(') else {
        return Ok((word.to_string(), Vec::new()));
    };

    if !word.ends_with(')') {
        return Err(SelectError::InvalidRole(word.to_string()));
    }

    let keyword = word[..open].to_string();
    let annotation = &word[open + 1..word.len() - 1];

    let mut roles = Vec::new();
    for field in annotation.split(',') {
        let field = field.trim();
        let number = field
            .strip_prefix('#')
            .ok_or_else(|| SelectError::InvalidRole(word.to_string()))?;

        match number.parse::<usize>() {
            Ok(role @ 1..=3) => roles.push(role - 1),
            _ => return Err(SelectError::InvalidRole(word.to_string())),
        }
    }

    Ok((keyword, roles))
}

/// Parse name arguments into patterns, recognizing `r'...'` regex blocks.
fn parse_name_patterns(words: &[String]) -> Result<Vec<NamePattern>, SelectError> {
    words
        .iter()
        .map(|word| {
            if let Some(pattern) = word
                .strip_prefix("r'")
                .and_then(|rest| rest.strip_suffix('\''))
            {
                let regex =
                    Regex::new(pattern).map_err(|_| SelectError::InvalidRegex(word.to_string()))?;
                Ok(NamePattern::Regex(regex))
            } else {
                Ok(NamePattern::Literal(unquote(word)))
            }
        })
        .collect()
}

/// Strip enclosing quotes from a token, if present.
fn unquote(word: &str) -> String {
    for quote in ['\'', '"'] {
        if let Some(inner) = word
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }

    word.to_string()
}

/// Wrap a leaf predicate in its role binding, if any.
fn apply_role(leaf: Select, roles: &[usize], token: &str) -> Result<Select, SelectError> {
    match roles {
        [] => Ok(leaf),
        [role] => Ok(Select::Role(*role, Box::new(leaf))),
        _ => Err(SelectError::InvalidRole(token.to_string())),
    }
}

fn parse_token(string: &str) -> Result<Select, SelectError> {
    if string.trim().is_empty() {
        return Err(SelectError::MissingArgument("".to_string()));
    }

    let token = split_with_quotes(string);
    let (keyword, roles) = parse_keyword(&token[0])?;

    match keyword.as_str() {
        "all" => {
            if token.len() > 1 || !roles.is_empty() {
                return Err(SelectError::InvalidToken(string.to_string()));
            }

            Ok(Select::All)
        }
        "name" | "atomname" => {
            if token.len() <= 1 {
                return Err(SelectError::EmptyArgument("".to_string()));
            }

            apply_role(
                Select::Name(parse_name_patterns(&token[1..])?),
                &roles,
                string,
            )
        }
        "element" => {
            if token.len() <= 1 {
                return Err(SelectError::EmptyArgument("".to_string()));
            }

            apply_role(
                Select::Element(token[1..].iter().map(|t| unquote(t)).collect()),
                &roles,
                string,
            )
        }
        "index" => {
            if token.len() <= 1 {
                return Err(SelectError::EmptyArgument("".to_string()));
            }

            let ranges = numbers::parse_numbers(&token[1..])?;
            apply_role(Select::Index(ranges), &roles, string)
        }
        "bonded" => {
            if token.len() > 1 {
                return Err(SelectError::InvalidToken(string.to_string()));
            }

            match roles.as_slice() {
                [i, j] if i != j => Ok(Select::Bonded(*i, *j)),
                _ => Err(SelectError::InvalidRole(string.to_string())),
            }
        }
        _ => Err(SelectError::UnknownKeyword(keyword)),
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/




#[cfg(test)]
mod evaluation_tests {
    use super::*;
    use crate::structures::{atom::Atom, vector3d::Vector3D};

    /// Three waters: OW HW1 HW2, OW HW1 HW2, OW HW1 HW2.
    fn water_frame() -> Frame {
        let mut atoms = Vec::new();
        for molecule in 0..3 {
            let shift = molecule as f64 * 3.0;
            atoms.push(Atom::new("OW", Vector3D::new(shift, 0.0, 0.0)).with_element("O"));
            atoms.push(Atom::new("HW1", Vector3D::new(shift + 1.0, 0.0, 0.0)).with_element("H"));
            atoms.push(Atom::new("HW2", Vector3D::new(shift, 1.0, 0.0)).with_element("H"));
        }

        let mut frame = Frame::new(atoms, None);
        frame.set_bonds(
            BondGraph::from_pairs(9, &[(0, 1), (0, 2), (3, 4), (3, 5), (6, 7), (6, 8)]).unwrap(),
        );

        frame
    }

    #[test]
    fn atoms_by_name() {
        let selection = CompiledSelection::compile("name OW", 1).unwrap();
        assert_eq!(selection.evaluate_atoms(&water_frame()).unwrap(), vec![0, 3, 6]);
    }

    #[test]
    fn atoms_by_element() {
        let selection = CompiledSelection::compile("element H", 1).unwrap();
        assert_eq!(
            selection.evaluate_atoms(&water_frame()).unwrap(),
            vec![1, 2, 4, 5, 7, 8]
        );
    }

    #[test]
    fn atoms_by_index_range() {
        let selection = CompiledSelection::compile("index 2 to 4", 1).unwrap();
        assert_eq!(selection.evaluate_atoms(&water_frame()).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn atoms_by_regex() {
        let selection = CompiledSelection::compile("name r'^HW.'", 1).unwrap();
        assert_eq!(
            selection.evaluate_atoms(&water_frame()).unwrap(),
            vec![1, 2, 4, 5, 7, 8]
        );
    }

    #[test]
    fn atoms_boolean_combination() {
        let selection = CompiledSelection::compile("element H and not name HW2", 1).unwrap();
        assert_eq!(selection.evaluate_atoms(&water_frame()).unwrap(), vec![1, 4, 7]);
    }

    #[test]
    fn atoms_all() {
        let selection = CompiledSelection::compile("all", 1).unwrap();
        assert_eq!(selection.evaluate_atoms(&water_frame()).unwrap().len(), 9);
    }

    #[test]
    fn pairs_role_bound() {
        let selection =
            CompiledSelection::compile("pairs: name(#1) OW and name(#2) HW1", 2).unwrap();
        assert_eq!(
            selection.evaluate_pairs(&water_frame()).unwrap(),
            vec![(0, 1), (0, 4), (0, 7), (3, 1), (3, 4), (3, 7), (6, 1), (6, 4), (6, 7)]
        );
    }

    #[test]
    fn pairs_bonded_relation() {
        let selection = CompiledSelection::compile(
            "pairs: element(#1) O and element(#2) H and bonded(#1,#2)",
            2,
        )
        .unwrap();
        assert_eq!(
            selection.evaluate_pairs(&water_frame()).unwrap(),
            vec![(0, 1), (0, 2), (3, 4), (3, 5), (6, 7), (6, 8)]
        );
    }

    #[test]
    fn pairs_bonded_requires_bonds() {
        let selection = CompiledSelection::compile("pairs: bonded(#1,#2)", 2).unwrap();
        let frame = Frame::new(vec![Atom::new("OW", Vector3D::default())], None);

        assert!(matches!(
            selection.evaluate_pairs(&frame),
            Err(SelectError::MissingBonds)
        ));
    }

    #[test]
    fn pairs_members_distinct() {
        let selection = CompiledSelection::compile("pairs: name(#1) OW and name(#2) OW", 2).unwrap();
        let pairs = selection.evaluate_pairs(&water_frame()).unwrap();

        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|(i, j)| i != j));
    }

    #[test]
    fn triples_water_angle() {
        let selection = CompiledSelection::compile(
            "angles: name(#1) HW1 and name(#2) OW and name(#3) HW2 \
             and bonded(#1,#2) and bonded(#2,#3)",
            3,
        )
        .unwrap();

        assert_eq!(
            selection.evaluate_triples(&water_frame()).unwrap(),
            vec![(1, 0, 2), (4, 3, 5), (7, 6, 8)]
        );
    }

    #[test]
    fn negated_role_prunes_soundly() {
        // `not` over a role-bound predicate must not lose valid tuples during pruning
        let selection =
            CompiledSelection::compile("pairs: name(#1) OW and not name(#2) OW", 2).unwrap();
        let pairs = selection.evaluate_pairs(&water_frame()).unwrap();

        assert_eq!(pairs.len(), 18);
        assert!(pairs.iter().all(|&(i, _)| i % 3 == 0));
        assert!(pairs.iter().all(|&(_, j)| j % 3 != 0));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let selection = CompiledSelection::compile("pairs: all", 2).unwrap();
        let frame = water_frame();

        assert_eq!(
            selection.evaluate_pairs(&frame).unwrap(),
            selection.evaluate_pairs(&frame).unwrap()
        );
    }
}

//! Access-control conditions and their combination tree.
//!
//! The wire form is a flat list mixing condition objects and bare
//! `{"operator": "and"|"or"}` markers, exactly as authored by the caller and
//! consumed by the threshold-encryption network. Internally the flat list is
//! parsed once into a [`ConditionExpr`] tree at the boundary, so nothing
//! downstream re-derives positional operator semantics.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConditionError;

/// Placeholder substituted with the decrypting party's address.
pub const USER_ADDRESS: &str = ":userAddress";

/// Comparison applied to a condition's return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "contains")]
    Contains,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Comparator::Eq => "=",
            Comparator::Ne => "!=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Contains => "contains",
        };
        f.write_str(s)
    }
}

/// The test applied to whatever the condition's method/function returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnValueTest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub comparator: Comparator,
    pub value: String,
}

impl ReturnValueTest {
    pub fn new(comparator: Comparator, value: impl Into<String>) -> Self {
        Self {
            key: None,
            comparator,
            value: value.into(),
        }
    }
}

/// A single access-control predicate over on-chain state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "conditionType")]
pub enum AccessCondition {
    /// A standard-method predicate (balance, ownership, timestamp, ...).
    #[serde(rename = "evmBasic", rename_all = "camelCase")]
    EvmBasic {
        contract_address: String,
        standard_contract_type: String,
        chain: String,
        method: String,
        parameters: Vec<String>,
        return_value_test: ReturnValueTest,
    },

    /// An arbitrary contract call described by its ABI fragment.
    #[serde(rename = "evmContract", rename_all = "camelCase")]
    EvmContract {
        contract_address: String,
        function_name: String,
        function_params: Vec<String>,
        /// The function's ABI fragment, carried verbatim.
        function_abi: serde_json::Value,
        chain: String,
        return_value_test: ReturnValueTest,
    },
}

impl AccessCondition {
    /// The chain this condition is evaluated on.
    pub fn chain(&self) -> &str {
        match self {
            AccessCondition::EvmBasic { chain, .. } => chain,
            AccessCondition::EvmContract { chain, .. } => chain,
        }
    }

    pub fn return_value_test(&self) -> &ReturnValueTest {
        match self {
            AccessCondition::EvmBasic {
                return_value_test, ..
            } => return_value_test,
            AccessCondition::EvmContract {
                return_value_test, ..
            } => return_value_test,
        }
    }
}

/// The always-true fallback gate: any address has a balance of at least zero.
pub fn balance_gate() -> AccessCondition {
    AccessCondition::EvmBasic {
        contract_address: String::new(),
        standard_contract_type: String::new(),
        chain: "amoy".to_string(),
        method: "eth_getBalance".to_string(),
        parameters: vec![USER_ADDRESS.to_string()],
        return_value_test: ReturnValueTest::new(Comparator::Ge, "0"),
    }
}

/// Logical combinator between sibling conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    And,
    Or,
}

/// A bare operator marker as it appears in the flat wire list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorNode {
    pub operator: Operator,
}

/// One entry of the flat wire list: a condition or an operator marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    Operator(OperatorNode),
    Condition(AccessCondition),
}

impl ConditionNode {
    pub fn condition(condition: AccessCondition) -> Self {
        ConditionNode::Condition(condition)
    }

    pub fn operator(operator: Operator) -> Self {
        ConditionNode::Operator(OperatorNode { operator })
    }
}

/// Serialize a flat condition list to its wire JSON.
pub fn serialize_nodes(nodes: &[ConditionNode]) -> Result<String, ConditionError> {
    Ok(serde_json::to_string(nodes)?)
}

/// Parse wire JSON back into the flat condition list.
pub fn parse_nodes(json: &str) -> Result<Vec<ConditionNode>, ConditionError> {
    Ok(serde_json::from_str(json)?)
}

/// An access-condition expression tree.
///
/// Built once from the flat list; left-associative, so
/// `a AND b OR c` parses as `Or(And(a, b), c)`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionExpr {
    Leaf(AccessCondition),
    And(Box<ConditionExpr>, Box<ConditionExpr>),
    Or(Box<ConditionExpr>, Box<ConditionExpr>),
}

impl ConditionExpr {
    /// Build the tree from the flat wire list.
    ///
    /// The list must start with a condition, alternate conditions and
    /// operators, and end with a condition.
    pub fn from_flat(nodes: &[ConditionNode]) -> Result<Self, ConditionError> {
        let mut expr: Option<ConditionExpr> = None;
        let mut pending: Option<Operator> = None;
        let mut last_condition = 0usize;

        for (i, node) in nodes.iter().enumerate() {
            match node {
                ConditionNode::Operator(op) => {
                    if expr.is_none() || pending.is_some() {
                        return Err(ConditionError::LeadingOperator(i));
                    }
                    pending = Some(op.operator);
                }
                ConditionNode::Condition(condition) => {
                    let leaf = ConditionExpr::Leaf(condition.clone());
                    expr = Some(match (expr.take(), pending.take()) {
                        (None, _) => leaf,
                        (Some(left), Some(Operator::And)) => {
                            ConditionExpr::And(Box::new(left), Box::new(leaf))
                        }
                        (Some(left), Some(Operator::Or)) => {
                            ConditionExpr::Or(Box::new(left), Box::new(leaf))
                        }
                        (Some(_), None) => {
                            return Err(ConditionError::MissingOperator(last_condition, i))
                        }
                    });
                    last_condition = i;
                }
            }
        }

        if pending.is_some() {
            return Err(ConditionError::TrailingOperator);
        }
        expr.ok_or(ConditionError::Empty)
    }

    /// Flatten back to the wire list (inverse of [`from_flat`]).
    ///
    /// [`from_flat`]: ConditionExpr::from_flat
    pub fn to_flat(&self) -> Vec<ConditionNode> {
        let mut nodes = Vec::new();
        self.flatten_into(&mut nodes);
        nodes
    }

    fn flatten_into(&self, nodes: &mut Vec<ConditionNode>) {
        match self {
            ConditionExpr::Leaf(condition) => {
                nodes.push(ConditionNode::Condition(condition.clone()))
            }
            ConditionExpr::And(left, right) => {
                left.flatten_into(nodes);
                nodes.push(ConditionNode::operator(Operator::And));
                right.flatten_into(nodes);
            }
            ConditionExpr::Or(left, right) => {
                left.flatten_into(nodes);
                nodes.push(ConditionNode::operator(Operator::Or));
                right.flatten_into(nodes);
            }
        }
    }

    /// All leaf conditions, left to right.
    pub fn leaves(&self) -> Vec<&AccessCondition> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a AccessCondition>) {
        match self {
            ConditionExpr::Leaf(condition) => out.push(condition),
            ConditionExpr::And(left, right) | ConditionExpr::Or(left, right) => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }

    /// The chain of the first (leftmost) condition.
    ///
    /// Authentication and decryption use this chain for the whole
    /// expression; conditions spanning multiple chains are not generalized
    /// over, matching the deployed protocol behavior.
    pub fn first_chain(&self) -> &str {
        match self {
            ConditionExpr::Leaf(condition) => condition.chain(),
            ConditionExpr::And(left, _) | ConditionExpr::Or(left, _) => left.first_chain(),
        }
    }
}

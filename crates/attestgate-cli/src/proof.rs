//! AnonAadhaar proof parsing.
//!
//! The AnonAadhaar preset verifies a Groth16 identity proof on-chain. The
//! user pastes the proof JSON and it is expanded into the resource
//! parameters the verifier contract expects.

use anyhow::{ensure, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Groth16Proof {
    pub pi_a: Vec<String>,
    pub pi_b: Vec<Vec<String>>,
    pub pi_c: Vec<String>,
    #[allow(dead_code)]
    pub protocol: Option<String>,
    #[allow(dead_code)]
    pub curve: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonAadhaarProof {
    pub groth16_proof: Groth16Proof,
    pub timestamp: String,
    pub nullifier_seed: String,
    pub nullifier: String,
    pub age_above18: String,
    pub gender: String,
    pub pincode: String,
    pub state: String,
}

impl AnonAadhaarProof {
    pub fn parse(json: &str) -> Result<Self> {
        let proof: Self = serde_json::from_str(json)?;
        let g = &proof.groth16_proof;
        ensure!(g.pi_a.len() >= 2, "groth16 proof pi_a needs two coordinates");
        ensure!(
            g.pi_b.len() >= 2 && g.pi_b[0].len() >= 2 && g.pi_b[1].len() >= 2,
            "groth16 proof pi_b needs a 2x2 coordinate block"
        );
        ensure!(g.pi_c.len() >= 2, "groth16 proof pi_c needs two coordinates");
        Ok(proof)
    }

    /// The resource parameters in verifier argument order: nullifier seed,
    /// nullifier, timestamp, signal, reveal array, flattened proof points.
    pub fn resources(&self) -> Vec<String> {
        let g = &self.groth16_proof;
        vec![
            self.nullifier_seed.clone(),
            self.nullifier.clone(),
            self.timestamp.clone(),
            "1".to_string(),
            format!(
                "[{},{},{},{}]",
                self.age_above18, self.gender, self.pincode, self.state
            ),
            format!(
                "[{},{},{},{},{},{},{},{}]",
                g.pi_a[0],
                g.pi_a[1],
                g.pi_b[0][1],
                g.pi_b[0][0],
                g.pi_b[1][1],
                g.pi_b[1][0],
                g.pi_c[0],
                g.pi_c[1],
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "groth16Proof": {
            "pi_a": ["1", "2"],
            "pi_b": [["3", "4"], ["5", "6"]],
            "pi_c": ["7", "8"],
            "protocol": "groth16",
            "curve": "bn128"
        },
        "pubkeyHash": "9",
        "timestamp": "1733600000",
        "nullifierSeed": "10",
        "nullifier": "11",
        "signalHash": "12",
        "ageAbove18": "1",
        "gender": "77",
        "pincode": "110001",
        "state": "452"
    }"#;

    #[test]
    fn test_parse_and_expand() {
        let proof = AnonAadhaarProof::parse(SAMPLE).unwrap();
        let resources = proof.resources();
        assert_eq!(resources.len(), 6);
        assert_eq!(resources[0], "10");
        assert_eq!(resources[3], "1");
        assert_eq!(resources[4], "[1,77,110001,452]");
        // pi_b coordinates are swapped within each pair.
        assert_eq!(resources[5], "[1,2,4,3,6,5,7,8]");
    }

    #[test]
    fn test_rejects_malformed_proof() {
        assert!(AnonAadhaarProof::parse(r#"{"groth16Proof":{"pi_a":[],"pi_b":[],"pi_c":[]},"timestamp":"0","nullifierSeed":"0","nullifier":"0","ageAbove18":"0","gender":"0","pincode":"0","state":"0"}"#).is_err());
    }
}

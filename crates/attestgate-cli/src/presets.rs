//! The built-in access-condition catalogue.
//!
//! Each preset is a ready-made condition the user can pick from the menu.
//! Timelock and AnonAadhaar need extra input and are finalized in the
//! action layer after prompting.

use attestgate::core::conditions::{
    AccessCondition, Comparator, ReturnValueTest, USER_ADDRESS,
};

/// A named condition preset.
pub struct Preset {
    pub name: &'static str,
    pub condition: fn() -> AccessCondition,
}

/// The selectable presets, in menu order.
pub fn catalogue() -> Vec<Preset> {
    vec![
        Preset {
            name: "Proof of Humanity",
            condition: proof_of_humanity,
        },
        Preset {
            name: "NFT Owner",
            condition: nft_owner,
        },
        Preset {
            name: "Burning Man 2021 POAP",
            condition: poap,
        },
        Preset {
            name: "Timelock",
            condition: timelock,
        },
        Preset {
            name: "Token Holder",
            condition: token_holder,
        },
        Preset {
            name: "AnonAadhaar",
            condition: anon_aadhaar,
        },
    ]
}

fn proof_of_humanity() -> AccessCondition {
    AccessCondition::EvmBasic {
        contract_address: "0xC5E9dDebb09Cd64DfaCab4011A0D5cEDaf7c9BDb".to_string(),
        standard_contract_type: "ProofOfHumanity".to_string(),
        chain: "amoy".to_string(),
        method: "isRegistered".to_string(),
        parameters: vec![USER_ADDRESS.to_string()],
        return_value_test: ReturnValueTest::new(Comparator::Eq, "true"),
    }
}

fn nft_owner() -> AccessCondition {
    AccessCondition::EvmBasic {
        contract_address: "0xCd2AE5e5371A6f667726A76B36D5CC161a5fB3e6".to_string(),
        standard_contract_type: "ERC721".to_string(),
        chain: "amoy".to_string(),
        method: "ownerOf".to_string(),
        parameters: vec!["1".to_string()],
        return_value_test: ReturnValueTest::new(Comparator::Eq, USER_ADDRESS),
    }
}

fn poap() -> AccessCondition {
    AccessCondition::EvmBasic {
        contract_address: "0x22C1f6050E56d2876009903609a2cC3fEf83B415".to_string(),
        standard_contract_type: "POAP".to_string(),
        chain: "amoy".to_string(),
        method: "tokenURI".to_string(),
        parameters: vec![],
        return_value_test: ReturnValueTest::new(Comparator::Contains, "Burning Man 2021"),
    }
}

fn timelock() -> AccessCondition {
    AccessCondition::EvmBasic {
        contract_address: String::new(),
        standard_contract_type: "timestamp".to_string(),
        chain: "amoy".to_string(),
        method: "eth_getBlockByNumber".to_string(),
        parameters: vec!["latest".to_string()],
        // Placeholder; the action layer sets the real unlock time.
        return_value_test: ReturnValueTest::new(Comparator::Ge, "0"),
    }
}

fn token_holder() -> AccessCondition {
    AccessCondition::EvmBasic {
        contract_address: String::new(),
        standard_contract_type: String::new(),
        chain: "amoy".to_string(),
        method: "eth_getBalance".to_string(),
        parameters: vec![USER_ADDRESS.to_string()],
        return_value_test: ReturnValueTest::new(Comparator::Gt, "0"),
    }
}

fn anon_aadhaar() -> AccessCondition {
    AccessCondition::EvmContract {
        contract_address: "0x6bE8Cec7a06BA19c39ef328e8c8940cEfeF7E281".to_string(),
        function_name: "verifyAnonAadhaarProof".to_string(),
        function_params: vec![
            ":litParam:nullifierSeed".to_string(),
            ":litParam:nullifier".to_string(),
            ":litParam:timestamp".to_string(),
            "1".to_string(),
            ":litParam:revealArray".to_string(),
            ":litParam:groth16Proof".to_string(),
        ],
        function_abi: serde_json::json!({
            "inputs": [
                { "internalType": "uint256", "name": "nullifierSeed", "type": "uint256" },
                { "internalType": "uint256", "name": "nullifier", "type": "uint256" },
                { "internalType": "uint256", "name": "timestamp", "type": "uint256" },
                { "internalType": "uint256", "name": "signal", "type": "uint256" },
                { "internalType": "uint256[4]", "name": "revealArray", "type": "uint256[4]" },
                { "internalType": "uint256[8]", "name": "groth16Proof", "type": "uint256[8]" },
            ],
            "name": "verifyAnonAadhaarProof",
            "outputs": [
                { "internalType": "bool", "name": "", "type": "bool" },
            ],
            "stateMutability": "view",
            "type": "function",
        }),
        chain: "sepolia".to_string(),
        return_value_test: ReturnValueTest {
            key: Some(String::new()),
            comparator: Comparator::Eq,
            value: "true".to_string(),
        },
    }
}

use alloy_primitives::{Address, U256};

use crate::abi::{EncodeError, TypedSignature};
use crate::operation::{MethodCall, OperationDescriptor};

/// `approve(address spender, uint256 amount)` with no arguments bound.
pub fn approve_method() -> Result<MethodCall, EncodeError> {
    Ok(MethodCall::new(
        "approve",
        TypedSignature::parse(&[("spender", "address"), ("amount", "uint256")])?,
    ))
}

/// Lets `spender` move up to `amount` of `token` out of the avatar.
pub fn approve(token: Address, spender: Address, amount: U256) -> Result<OperationDescriptor, EncodeError> {
    let method = approve_method()?.fixed("spender", spender).arg("amount", amount);
    Ok(OperationDescriptor::call(token, method))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, hex};

    #[test]
    fn approve_golden_vector() {
        let token = address!("0xae7ab96520DE3A18E5e111B5EaAb095312D7fE84");
        let spender = address!("0x889edC2eDab5f40e902b864aD4d7AdE8E412F9B1");
        let tx = approve(token, spender, U256::from(100))
            .unwrap()
            .to_tx_data(None)
            .unwrap();
        assert_eq!(tx.to, token);
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(
            tx.data.as_ref(),
            hex!(
                "095ea7b3000000000000000000000000889edc2edab5f40e902b864ad4d7ade8e412f9b10000000000000000000000000000000000000000000000000000000000000064"
            )
        );
    }
}

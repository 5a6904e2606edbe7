//! Lido liquid staking on Ethereum mainnet: staking, wrapping and the withdrawal queue.

use alloy_primitives::{Address, B256, U256, address};

use crate::abi::{AbiType, AbiValue, EncodeError, Param, TypedSignature};
use crate::operation::{MethodCall, OperationDescriptor};
use crate::protocols::erc20;

/// stETH token, also the staking entry point.
pub const STETH: Address = address!("0xae7ab96520DE3A18E5e111B5EaAb095312D7fE84");
/// Wrapped stETH.
pub const WSTETH: Address = address!("0x7f39C581F595B53c5cb19bD0b3f8dA6c935E2Ca0");
/// Withdrawal queue (unstETH NFT).
pub const UNSTETH: Address = address!("0x889edC2eDab5f40e902b864aD4d7AdE8E412F9B1");

/// EIP-2612 permit attached to a withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permit {
    pub value: U256,
    pub deadline: U256,
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

impl From<Permit> for AbiValue {
    fn from(permit: Permit) -> Self {
        AbiValue::Tuple(vec![
            permit.value.into(),
            permit.deadline.into(),
            permit.v.into(),
            permit.r.into(),
            permit.s.into(),
        ])
    }
}

fn permit_param() -> Result<Param, EncodeError> {
    Ok(Param::tuple(
        "permit",
        vec![
            Param::parse("value", "uint256")?,
            Param::parse("deadline", "uint256")?,
            Param::parse("v", "uint8")?,
            Param::parse("r", "bytes32")?,
            Param::parse("s", "bytes32")?,
        ],
    ))
}

fn amounts_param() -> Param {
    Param::new("amounts", AbiType::Array(Box::new(AbiType::Uint(256))))
}

pub fn approve_steth_for_wsteth(amount: U256) -> Result<OperationDescriptor, EncodeError> {
    erc20::approve(STETH, WSTETH, amount)
}

pub fn approve_steth_for_unsteth(amount: U256) -> Result<OperationDescriptor, EncodeError> {
    erc20::approve(STETH, UNSTETH, amount)
}

pub fn approve_wsteth_for_unsteth(amount: U256) -> Result<OperationDescriptor, EncodeError> {
    erc20::approve(WSTETH, UNSTETH, amount)
}

/// Stakes `eth_amount` wei for stETH, with no referral.
pub fn deposit(eth_amount: U256) -> Result<OperationDescriptor, EncodeError> {
    let method = MethodCall::new("submit", TypedSignature::parse(&[("referral", "address")])?)
        .fixed("referral", Address::ZERO);
    Ok(OperationDescriptor::call(STETH, method).with_value(eth_amount))
}

/// stETH into wstETH.
pub fn wrap(amount: U256) -> Result<OperationDescriptor, EncodeError> {
    let method =
        MethodCall::new("wrap", TypedSignature::parse(&[("amount", "uint256")])?).arg("amount", amount);
    Ok(OperationDescriptor::call(WSTETH, method))
}

/// wstETH back into stETH.
pub fn unwrap(amount: U256) -> Result<OperationDescriptor, EncodeError> {
    let method = MethodCall::new("unwrap", TypedSignature::parse(&[("amount", "uint256")])?)
        .arg("amount", amount);
    Ok(OperationDescriptor::call(WSTETH, method))
}

fn request_withdrawals(name: &str, amounts: Vec<U256>) -> Result<OperationDescriptor, EncodeError> {
    let signature = TypedSignature::new(vec![amounts_param(), Param::parse("owner", "address")?])?;
    let method = MethodCall::new(name, signature)
        .bind_avatar("owner")
        .arg("amounts", amounts);
    Ok(OperationDescriptor::call(UNSTETH, method))
}

fn request_withdrawals_with_permit(
    name: &str,
    amounts: Vec<U256>,
    permit: Permit,
) -> Result<OperationDescriptor, EncodeError> {
    let signature = TypedSignature::new(vec![
        amounts_param(),
        Param::parse("owner", "address")?,
        permit_param()?,
    ])?;
    let method = MethodCall::new(name, signature)
        .bind_avatar("owner")
        .arg("amounts", amounts)
        .arg("permit", permit);
    Ok(OperationDescriptor::call(UNSTETH, method))
}

/// Queues stETH for withdrawal; the unstETH NFTs go to the avatar.
pub fn request_withdrawals_steth(amounts: Vec<U256>) -> Result<OperationDescriptor, EncodeError> {
    request_withdrawals("requestWithdrawals", amounts)
}

/// Burns wstETH and queues the resulting stETH for withdrawal.
pub fn request_withdrawals_wsteth(amounts: Vec<U256>) -> Result<OperationDescriptor, EncodeError> {
    request_withdrawals("requestWithdrawalsWstETH", amounts)
}

/// As [`request_withdrawals_steth`], authorizing the queue with a permit instead of an allowance.
pub fn request_withdrawals_with_permit_steth(
    amounts: Vec<U256>,
    permit: Permit,
) -> Result<OperationDescriptor, EncodeError> {
    request_withdrawals_with_permit("requestWithdrawalsWithPermit", amounts, permit)
}

pub fn request_withdrawals_with_permit_wsteth(
    amounts: Vec<U256>,
    permit: Permit,
) -> Result<OperationDescriptor, EncodeError> {
    request_withdrawals_with_permit("requestWithdrawalsWstETHWithPermit", amounts, permit)
}

/// Claims one finalized request, burning its NFT.
pub fn claim_withdrawal(request_id: U256) -> Result<OperationDescriptor, EncodeError> {
    let method = MethodCall::new(
        "claimWithdrawal",
        TypedSignature::parse(&[("requestId", "uint256")])?,
    )
    .arg("requestId", request_id);
    Ok(OperationDescriptor::call(UNSTETH, method))
}

/// Claims several finalized requests; `hints` come from `findCheckpointHints`.
pub fn claim_withdrawals(request_ids: Vec<U256>, hints: Vec<U256>) -> Result<OperationDescriptor, EncodeError> {
    let method = MethodCall::new(
        "claimWithdrawals",
        TypedSignature::parse(&[("requestIds", "uint256[]"), ("hints", "uint256[]")])?,
    )
    .arg("requestIds", request_ids)
    .arg("hints", hints);
    Ok(OperationDescriptor::call(UNSTETH, method))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Operation;
    use alloy_primitives::{b256, hex};
    use alloy_sol_types::{SolCall, sol};

    const AVATAR: Address = address!("0xC01318baB7ee1f5ba734172bF7718b5DC6Ec90E1");

    sol! {
        struct PermitInput {
            uint256 value;
            uint256 deadline;
            uint8 v;
            bytes32 r;
            bytes32 s;
        }

        function requestWithdrawalsWithPermit(uint256[] amounts, address owner, PermitInput permit) external;
        function requestWithdrawalsWstETHWithPermit(uint256[] amounts, address owner, PermitInput permit) external;
        function claimWithdrawal(uint256 requestId) external;
        function submit(address referral) external payable returns (uint256);
    }

    #[test]
    fn withdrawal_approvals_target_the_queue() {
        let expected = hex!(
            "095ea7b3000000000000000000000000889edc2edab5f40e902b864ad4d7ade8e412f9b10000000000000000000000000000000000000000000000000000000000000064"
        );
        let steth = approve_steth_for_unsteth(U256::from(100))
            .unwrap()
            .to_tx_data(None)
            .unwrap();
        let wsteth = approve_wsteth_for_unsteth(U256::from(100))
            .unwrap()
            .to_tx_data(None)
            .unwrap();
        assert_eq!(steth.data.as_ref(), expected);
        assert_eq!(wsteth.data.as_ref(), expected);
        assert_eq!(steth.to, STETH);
        assert_eq!(wsteth.to, WSTETH);
    }

    #[test]
    fn deposit_carries_value_and_zero_referral() {
        let tx = deposit(U256::from(10)).unwrap().to_tx_data(None).unwrap();
        assert_eq!(tx.value, U256::from(10));
        assert_eq!(tx.to, STETH);
        assert_eq!(tx.operation, Operation::Call);
        assert_eq!(
            tx.data.as_ref(),
            submitCall {
                referral: Address::ZERO
            }
            .abi_encode()
            .as_slice()
        );
    }

    #[test]
    fn request_withdrawals_golden_vectors() {
        let steth = request_withdrawals_steth(vec![U256::from(1_000)])
            .unwrap()
            .to_tx_data(Some(AVATAR))
            .unwrap();
        assert_eq!(
            steth.data.as_ref(),
            hex!(
                "d6681042"
                "0000000000000000000000000000000000000000000000000000000000000040"
                "000000000000000000000000c01318bab7ee1f5ba734172bf7718b5dc6ec90e1"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "00000000000000000000000000000000000000000000000000000000000003e8"
            )
        );

        let wsteth = request_withdrawals_wsteth(vec![U256::from(1_000)])
            .unwrap()
            .to_tx_data(Some(AVATAR))
            .unwrap();
        assert_eq!(&wsteth.data[..4], hex!("19aa6257"));
        assert_eq!(&wsteth.data[4..], &steth.data[4..]);
        assert_eq!(wsteth.to, UNSTETH);
    }

    #[test]
    fn claim_withdrawals_golden_vector() {
        let tx = claim_withdrawals(vec![U256::from(1)], vec![U256::from(35)])
            .unwrap()
            .to_tx_data(None)
            .unwrap();
        assert_eq!(
            tx.data.as_ref(),
            hex!(
                "e3afe0a3"
                "0000000000000000000000000000000000000000000000000000000000000040"
                "0000000000000000000000000000000000000000000000000000000000000080"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "0000000000000000000000000000000000000000000000000000000000000023"
            )
        );
    }

    #[test]
    fn claim_single_withdrawal() {
        let tx = claim_withdrawal(U256::from(7)).unwrap().to_tx_data(None).unwrap();
        assert_eq!(
            tx.data.as_ref(),
            claimWithdrawalCall {
                requestId: U256::from(7)
            }
            .abi_encode()
            .as_slice()
        );
    }

    #[test]
    fn permit_requests_encode_the_tuple_inline() {
        let permit = Permit {
            value: U256::from(1_000),
            deadline: U256::from(1_700_000_000u64),
            v: 28,
            r: b256!("0x1111111111111111111111111111111111111111111111111111111111111111"),
            s: b256!("0x2222222222222222222222222222222222222222222222222222222222222222"),
        };
        let oracle_permit = PermitInput {
            value: permit.value,
            deadline: permit.deadline,
            v: permit.v,
            r: permit.r,
            s: permit.s,
        };

        let steth = request_withdrawals_with_permit_steth(vec![U256::from(1_000)], permit)
            .unwrap()
            .to_tx_data(Some(AVATAR))
            .unwrap();
        let expected = requestWithdrawalsWithPermitCall {
            amounts: vec![U256::from(1_000)],
            owner: AVATAR,
            permit: oracle_permit.clone(),
        }
        .abi_encode();
        assert_eq!(steth.data.as_ref(), expected.as_slice());

        let wsteth = request_withdrawals_with_permit_wsteth(vec![U256::from(1_000)], permit)
            .unwrap()
            .to_tx_data(Some(AVATAR))
            .unwrap();
        let expected = requestWithdrawalsWstETHWithPermitCall {
            amounts: vec![U256::from(1_000)],
            owner: AVATAR,
            permit: oracle_permit,
        }
        .abi_encode();
        assert_eq!(wsteth.data.as_ref(), expected.as_slice());
    }

    #[test]
    fn requests_need_an_avatar() {
        let request = request_withdrawals_steth(vec![U256::from(1)]).unwrap();
        assert_eq!(
            request.to_tx_data(None).unwrap_err(),
            EncodeError::UnresolvedAvatar("owner".into())
        );
    }
}

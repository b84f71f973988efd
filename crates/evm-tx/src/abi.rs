//! Contract ABI bindings
//!
//! Lending contract, Equito router and ERC-20 surfaces used by the flows.
//! Everything lives in one `sol!` block so the router call can reference the
//! message struct.

use alloy_sol_types::sol;

sol! {
    /// Equito peer identifier, split into two 32-byte words
    #[derive(Debug, PartialEq, Eq)]
    struct PeerAddress {
        bytes32 lower;
        bytes32 upper;
    }

    /// Cross-chain message emitted by the lending contract
    #[derive(Debug, PartialEq, Eq)]
    struct EquitoMessage {
        uint256 blockNumber;
        uint256 sourceChainSelector;
        PeerAddress sender;
        uint256 destinationChainSelector;
        PeerAddress receiver;
        bytes32 hashedData;
    }

    #[derive(Debug, PartialEq, Eq)]
    event MessageSendRequested(EquitoMessage message, bytes data);

    // Lending contract
    function borrow(address token, uint256 amount) external payable;
    function lend(address token, uint256 amount) external payable;
    function withdraw(address token, uint256 amount) external payable;
    function repay(address token, uint256 amount) external payable;
    function getSupportedAssets(uint256 chainSelector) external view returns (address[]);

    // Equito router
    function getFee(address sender) external view returns (uint256);
    function deliverAndExecuteMessage(
        EquitoMessage calldata message,
        bytes calldata messageData,
        uint256 verifierIndex,
        bytes calldata proof
    ) external payable;

    // ERC-20
    function approve(address spender, uint256 amount) external returns (bool);
    function name() external view returns (string);
    function symbol() external view returns (string);
    function decimals() external view returns (uint8);
}

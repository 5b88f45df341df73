// Generated bindings for the deployed message store.
pub mod messenger {
    use alloy::sol;

    sol! {
        #[derive(Debug)]
        #[sol(rpc)]
        contract Messenger {
            struct Message {
                address sender;
                address receiver;
                uint256 depositAmount;
                uint256 timestamp;
                string text;
                bool isPending;
            }

            error EmptyMessage();
            error InvalidReceiver(address receiver);

            event NewMessage(
                address sender,
                address receiver,
                uint256 depositAmount,
                uint256 timestamp,
                string text,
                bool isPending
            );

            function getOwnMessages() external view returns (Message[] memory);

            function sendMessage(string calldata text, address receiver) external payable;
        }
    }
}

pub use messenger::Messenger;

use async_trait::async_trait;
use log::trace;
use reelchain_common::{
    api::{
        BigInt, CoinPage, DryRunResponse, EventFilter, EventId, EventPage, ExecuteRequestType,
        ObjectDataOptions, ObjectPage, ObjectQuery, ObjectResponse, TransactionResponse,
        TransactionResponseOptions,
    },
    crypto::{Address, ObjectId},
    rpc::{JsonRpcClient, RpcClientConfig, RpcError},
    transaction::SignedTransaction,
};

use crate::ledger::{EventOrder, LedgerApi};

// Methods of the full node JSON-RPC interface
pub const GET_OWNED_OBJECTS: &str = "suix_getOwnedObjects";
pub const MULTI_GET_OBJECTS: &str = "sui_multiGetObjects";
pub const QUERY_EVENTS: &str = "suix_queryEvents";
pub const GET_COINS: &str = "suix_getCoins";
pub const GET_REFERENCE_GAS_PRICE: &str = "suix_getReferenceGasPrice";
pub const EXECUTE_TRANSACTION_BLOCK: &str = "sui_executeTransactionBlock";
pub const DRY_RUN_TRANSACTION_BLOCK: &str = "sui_dryRunTransactionBlock";

// Full node reached over HTTP JSON-RPC
pub struct NodeAPI {
    client: JsonRpcClient,
}

impl NodeAPI {
    pub fn new(node_address: &str) -> Result<Self, RpcError> {
        Self::with(node_address, RpcClientConfig::default())
    }

    pub fn with(node_address: &str, config: RpcClientConfig) -> Result<Self, RpcError> {
        Ok(Self {
            client: JsonRpcClient::with_config(node_address, config)?,
        })
    }
}

#[async_trait]
impl LedgerApi for NodeAPI {
    async fn get_owned_objects(
        &self,
        owner: &Address,
        query: &ObjectQuery,
        cursor: Option<&ObjectId>,
        limit: Option<usize>,
    ) -> Result<ObjectPage, RpcError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get_owned_objects {} cursor {:?}", owner, cursor);
        }
        self.client
            .call(GET_OWNED_OBJECTS, (owner, query, cursor, limit))
            .await
    }

    async fn multi_get_objects(
        &self,
        ids: &[ObjectId],
        options: &ObjectDataOptions,
    ) -> Result<Vec<ObjectResponse>, RpcError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("multi_get_objects {} ids", ids.len());
        }
        self.client.call(MULTI_GET_OBJECTS, (ids, options)).await
    }

    async fn query_events(
        &self,
        filter: &EventFilter,
        cursor: Option<&EventId>,
        limit: Option<usize>,
        order: EventOrder,
    ) -> Result<EventPage, RpcError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("query_events {:?} cursor {:?}", filter, cursor);
        }
        self.client
            .call(QUERY_EVENTS, (filter, cursor, limit, order.is_descending()))
            .await
    }

    async fn get_coins(
        &self,
        owner: &Address,
        coin_type: &str,
        cursor: Option<&ObjectId>,
        limit: Option<usize>,
    ) -> Result<CoinPage, RpcError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get_coins {} {}", owner, coin_type);
        }
        self.client
            .call(GET_COINS, (owner, coin_type, cursor, limit))
            .await
    }

    async fn get_reference_gas_price(&self) -> Result<u64, RpcError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get_reference_gas_price");
        }
        let price: BigInt = self
            .client
            .call(GET_REFERENCE_GAS_PRICE, [(); 0])
            .await?;
        Ok(price.into())
    }

    async fn execute_transaction(
        &self,
        transaction: &SignedTransaction,
    ) -> Result<TransactionResponse, RpcError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("execute_transaction {}", transaction.digest());
        }
        self.client
            .call(
                EXECUTE_TRANSACTION_BLOCK,
                (
                    transaction.tx_bytes_base64(),
                    transaction.signatures_base64(),
                    TransactionResponseOptions::outcome(),
                    ExecuteRequestType::WaitForLocalExecution,
                ),
            )
            .await
    }

    async fn dry_run_transaction(
        &self,
        transaction: &SignedTransaction,
    ) -> Result<DryRunResponse, RpcError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("dry_run_transaction {}", transaction.digest());
        }
        self.client
            .call(DRY_RUN_TRANSACTION_BLOCK, (transaction.tx_bytes_base64(),))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelchain_common::api::ObjectFilter;
    use serde_json::{json, Value};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    fn header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    // Answer a single JSON-RPC request with `result` and hand back the request body
    async fn serve_once(result: Value) -> (String, JoinHandle<Value>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let body = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before the request was complete");
                buf.extend_from_slice(&chunk[..n]);

                let Some(end) = header_end(&buf) else {
                    continue;
                };
                let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .map(|v| v.trim().parse::<usize>().unwrap())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break buf[end + 4..end + 4 + length].to_vec();
                }
            };

            let request: Value = serde_json::from_slice(&body).unwrap();
            let response =
                json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }).to_string();
            let reply = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                response.len(),
                response
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            request
        });

        (address, handle)
    }

    #[tokio::test]
    async fn test_reference_gas_price() {
        let (address, request) = serve_once(json!("750")).await;
        let node = NodeAPI::new(&address).unwrap();

        assert_eq!(node.get_reference_gas_price().await.unwrap(), 750);
        let request = request.await.unwrap();
        assert_eq!(request["jsonrpc"], "2.0");
        assert_eq!(request["method"], GET_REFERENCE_GAS_PRICE);
        assert_eq!(request["params"], json!([]));
    }

    #[tokio::test]
    async fn test_query_events_params() {
        let (address, request) =
            serve_once(json!({ "data": [], "nextCursor": null, "hasNextPage": false })).await;
        let node = NodeAPI::new(&address).unwrap();

        let filter = EventFilter::MoveEventType("0xaa::profile::ProfileCreated".to_owned());
        let page = node
            .query_events(&filter, None, Some(50), EventOrder::Descending)
            .await
            .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.continuation(), None);

        let request = request.await.unwrap();
        assert_eq!(request["method"], QUERY_EVENTS);
        assert_eq!(
            request["params"],
            json!([{ "MoveEventType": "0xaa::profile::ProfileCreated" }, null, 50, true])
        );
    }

    #[tokio::test]
    async fn test_owned_objects_params() {
        let (address, request) =
            serve_once(json!({ "data": [], "nextCursor": null, "hasNextPage": false })).await;
        let node = NodeAPI::new(&address).unwrap();

        let query = ObjectQuery {
            filter: Some(ObjectFilter::StructType("0xaa::profile::ProfileOwnerCap".to_owned())),
            options: ObjectDataOptions::with_content(),
        };
        let owner = Address::from_u8(0x11);
        node.get_owned_objects(&owner, &query, None, Some(10))
            .await
            .unwrap();

        let request = request.await.unwrap();
        assert_eq!(request["method"], GET_OWNED_OBJECTS);
        let params = request["params"].as_array().unwrap();
        assert_eq!(params[0], json!(owner));
        assert_eq!(
            params[1]["filter"],
            json!({ "StructType": "0xaa::profile::ProfileOwnerCap" })
        );
        assert_eq!(params[1]["options"]["showContent"], true);
        assert_eq!(params[2], Value::Null);
        assert_eq!(params[3], 10);
    }

    #[tokio::test]
    async fn test_unreachable_node_is_transient() {
        let node = NodeAPI::new("127.0.0.1:9").unwrap();
        let err = node.get_reference_gas_price().await.unwrap_err();
        assert!(err.is_transient());
    }
}

//! Cosmos REST gateway client.

use serde::de::DeserializeOwned;

use super::{ClientError, endpoint, get_json, http_client};
use crate::types::params::ParamsEnvelope;
use crate::types::staking::{
    DelegationResponses, RedelegationResponses, SigningInfoResponse, SigningInfosResponse,
    UnbondingResponses, ValidatorResponse, ValidatorsResponse,
};
use crate::types::{
    AllBalancesResponse, CommunityPoolResponse, DelegationResponse, DelegatorRewardsResponse,
    DenomsMetadataResponse, DistributionParams, InflationResponse, Metadata, MintParams,
    PoolResponse, RedelegationResponse, SlashingParams, StakingParams, TotalSupplyResponse,
    UnbondingDelegation, Validator, ValidatorCommissionResponse,
    ValidatorOutstandingRewardsResponse, ValidatorSigningInfo,
};

/// Typed access to the node's bank, staking, distribution, mint and
/// slashing query services.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct CosmosClient {
    http: reqwest::Client,
    base_url: String,
    limit: u64,
}

impl CosmosClient {
    /// Creates a client for the REST gateway at `base_url`, e.g.
    /// `"http://localhost:1317"`. `limit` is the page size used for list
    /// queries.
    pub fn new(base_url: &str, limit: u64) -> Result<Self, ClientError> {
        Ok(Self {
            http: http_client()?,
            base_url: super::base_url(base_url)?,
            limit,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        get_json(&self.http, endpoint(&self.base_url, path), &[]).await
    }

    async fn get_page<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let query = [("pagination.limit", self.limit.to_string())];
        get_json(&self.http, endpoint(&self.base_url, path), &query).await
    }

    // ---------------------------
    // bank
    // ---------------------------

    pub async fn total_supply(&self) -> Result<TotalSupplyResponse, ClientError> {
        self.get_page("/cosmos/bank/v1beta1/supply").await
    }

    pub async fn all_balances(&self, address: &str) -> Result<AllBalancesResponse, ClientError> {
        self.get_page(&format!("/cosmos/bank/v1beta1/balances/{address}"))
            .await
    }

    pub async fn denoms_metadata(&self) -> Result<Vec<Metadata>, ClientError> {
        let resp: DenomsMetadataResponse = self.get("/cosmos/bank/v1beta1/denoms_metadata").await?;
        Ok(resp.metadatas)
    }

    // ---------------------------
    // staking
    // ---------------------------

    pub async fn staking_pool(&self) -> Result<PoolResponse, ClientError> {
        self.get("/cosmos/staking/v1beta1/pool").await
    }

    pub async fn validator(&self, operator_address: &str) -> Result<Validator, ClientError> {
        let resp: ValidatorResponse = self
            .get(&format!("/cosmos/staking/v1beta1/validators/{operator_address}"))
            .await?;
        Ok(resp.validator)
    }

    /// Returns every validator regardless of status, up to the page limit.
    pub async fn validators(&self) -> Result<Vec<Validator>, ClientError> {
        let resp: ValidatorsResponse = self.get_page("/cosmos/staking/v1beta1/validators").await?;
        Ok(resp.validators)
    }

    pub async fn delegator_delegations(
        &self,
        delegator: &str,
    ) -> Result<Vec<DelegationResponse>, ClientError> {
        let resp: DelegationResponses = self
            .get_page(&format!("/cosmos/staking/v1beta1/delegations/{delegator}"))
            .await?;
        Ok(resp.delegation_responses)
    }

    pub async fn delegator_unbonding_delegations(
        &self,
        delegator: &str,
    ) -> Result<Vec<UnbondingDelegation>, ClientError> {
        let resp: UnbondingResponses = self
            .get_page(&format!(
                "/cosmos/staking/v1beta1/delegators/{delegator}/unbonding_delegations"
            ))
            .await?;
        Ok(resp.unbonding_responses)
    }

    pub async fn redelegations(
        &self,
        delegator: &str,
    ) -> Result<Vec<RedelegationResponse>, ClientError> {
        let resp: RedelegationResponses = self
            .get_page(&format!(
                "/cosmos/staking/v1beta1/delegators/{delegator}/redelegations"
            ))
            .await?;
        Ok(resp.redelegation_responses)
    }

    pub async fn validator_delegations(
        &self,
        operator_address: &str,
    ) -> Result<Vec<DelegationResponse>, ClientError> {
        let resp: DelegationResponses = self
            .get_page(&format!(
                "/cosmos/staking/v1beta1/validators/{operator_address}/delegations"
            ))
            .await?;
        Ok(resp.delegation_responses)
    }

    pub async fn validator_unbonding_delegations(
        &self,
        operator_address: &str,
    ) -> Result<Vec<UnbondingDelegation>, ClientError> {
        let resp: UnbondingResponses = self
            .get_page(&format!(
                "/cosmos/staking/v1beta1/validators/{operator_address}/unbonding_delegations"
            ))
            .await?;
        Ok(resp.unbonding_responses)
    }

    pub async fn staking_params(&self) -> Result<StakingParams, ClientError> {
        let resp: ParamsEnvelope<StakingParams> = self.get("/cosmos/staking/v1beta1/params").await?;
        Ok(resp.params)
    }

    // ---------------------------
    // distribution
    // ---------------------------

    pub async fn community_pool(&self) -> Result<CommunityPoolResponse, ClientError> {
        self.get("/cosmos/distribution/v1beta1/community_pool").await
    }

    pub async fn delegator_rewards(
        &self,
        delegator: &str,
    ) -> Result<DelegatorRewardsResponse, ClientError> {
        self.get(&format!(
            "/cosmos/distribution/v1beta1/delegators/{delegator}/rewards"
        ))
        .await
    }

    pub async fn validator_commission(
        &self,
        operator_address: &str,
    ) -> Result<ValidatorCommissionResponse, ClientError> {
        self.get(&format!(
            "/cosmos/distribution/v1beta1/validators/{operator_address}/commission"
        ))
        .await
    }

    pub async fn validator_outstanding_rewards(
        &self,
        operator_address: &str,
    ) -> Result<ValidatorOutstandingRewardsResponse, ClientError> {
        self.get(&format!(
            "/cosmos/distribution/v1beta1/validators/{operator_address}/outstanding_rewards"
        ))
        .await
    }

    pub async fn distribution_params(&self) -> Result<DistributionParams, ClientError> {
        let resp: ParamsEnvelope<DistributionParams> =
            self.get("/cosmos/distribution/v1beta1/params").await?;
        Ok(resp.params)
    }

    // ---------------------------
    // mint
    // ---------------------------

    pub async fn mint_params(&self) -> Result<MintParams, ClientError> {
        let resp: ParamsEnvelope<MintParams> = self.get("/cosmos/mint/v1beta1/params").await?;
        Ok(resp.params)
    }

    pub async fn inflation(&self) -> Result<InflationResponse, ClientError> {
        self.get("/cosmos/mint/v1beta1/inflation").await
    }

    // ---------------------------
    // slashing
    // ---------------------------

    pub async fn signing_info(
        &self,
        consensus_address: &str,
    ) -> Result<ValidatorSigningInfo, ClientError> {
        let resp: SigningInfoResponse = self
            .get(&format!(
                "/cosmos/slashing/v1beta1/signing_infos/{consensus_address}"
            ))
            .await?;
        Ok(resp.val_signing_info)
    }

    pub async fn signing_infos(&self) -> Result<Vec<ValidatorSigningInfo>, ClientError> {
        let resp: SigningInfosResponse = self.get_page("/cosmos/slashing/v1beta1/signing_infos").await?;
        Ok(resp.info)
    }

    pub async fn slashing_params(&self) -> Result<SlashingParams, ClientError> {
        let resp: ParamsEnvelope<SlashingParams> = self.get("/cosmos/slashing/v1beta1/params").await?;
        Ok(resp.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn total_supply_sends_page_limit() {
        let server = MockServer::start_async().await;
        let supply = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/cosmos/bank/v1beta1/supply")
                    .query_param("pagination.limit", "250");
                then.status(200).json_body(json!({
                    "supply": [{ "denom": "uatom", "amount": "5000000" }],
                    "pagination": { "next_key": null, "total": "1" }
                }));
            })
            .await;

        let client = CosmosClient::new(&server.base_url(), 250).expect("client");
        let resp = client.total_supply().await.expect("supply");

        supply.assert_async().await;
        assert_eq!(resp.supply.len(), 1);
        assert_eq!(resp.supply[0].denom, "uatom");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/cosmos/staking/v1beta1/pool");
                then.status(503);
            })
            .await;

        let client = CosmosClient::new(&server.base_url(), 100).expect("client");
        let err = client.staking_pool().await.expect_err("503 should fail");

        assert!(matches!(err, ClientError::Status { .. }));
    }

    #[tokio::test]
    async fn staking_params_unwraps_envelope() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/cosmos/staking/v1beta1/params");
                then.status(200).json_body(json!({
                    "params": {
                        "unbonding_time": "1209600s",
                        "max_validators": 100,
                        "max_entries": 7,
                        "historical_entries": 10000,
                        "bond_denom": "acudos"
                    }
                }));
            })
            .await;

        let client = CosmosClient::new(&server.base_url(), 100).expect("client");
        let params = client.staking_params().await.expect("params");

        assert_eq!(params.bond_denom, "acudos");
        assert_eq!(params.max_validators, 100);
    }
}

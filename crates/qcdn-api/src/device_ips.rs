// Origin allow-list: `/api/1.0/network/device-ip` on the device-ip service.

use crate::client::ApiClient;
use crate::endpoint::DEVICE_IP_SERVICE;
use crate::error::Error;
use crate::models::DeviceIps;

#[derive(Debug, Clone)]
pub struct DeviceIpsClient {
    api: ApiClient,
}

impl DeviceIpsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Addresses customers must allow on their origins.
    pub async fn origin_allow_list(&self) -> Result<DeviceIps, Error> {
        self.api
            .get(DEVICE_IP_SERVICE, "/api/1.0/network/device-ip")
            .await
    }
}

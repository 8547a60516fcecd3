mod fmp_client;

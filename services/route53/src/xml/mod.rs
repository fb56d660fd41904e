// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Route53 XML bodies.

mod deserialize;
pub use deserialize::{
    parse_change_info, parse_create_hosted_zone, parse_error_response,
    parse_list_hosted_zones, parse_list_resource_record_sets, HostedZonePage, RecordSetPage,
};

mod serialize;
pub use serialize::{build_change_batch, build_create_hosted_zone};

/// Namespace of every Route53 request and response document.
pub const ROUTE53_NAMESPACE: &str = "https://route53.amazonaws.com/doc/2013-04-01/";

//! Tests for the batch worker pool.

mod pool;

use sclh_test_utils::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::util::TestSetupExt;

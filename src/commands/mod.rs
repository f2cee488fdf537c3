// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod transactions;
pub mod catalog;
pub mod traders;
pub mod stock;
pub mod reports;
pub mod backup;
pub mod users;
pub mod dashboard;
pub mod activity;
pub mod config;
pub mod doctor;

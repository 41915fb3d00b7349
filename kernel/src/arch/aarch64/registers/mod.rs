// Copyright (c) 2025 vivo Mobile Communication Co., Ltd.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//       http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub mod cntfrq_el0;
pub mod cntp_ctl_el0;
pub mod cntp_tval_el0;
pub mod cntpct_el0;
pub mod cpacr_el1;
pub mod daif;
pub mod esr_el1;
pub mod mair_el1;
pub mod mpidr_el1;
pub mod sctlr_el1;
pub mod spsel;
pub mod tcr_el1;
pub mod ttbr0_el1;
pub mod ttbr1_el1;
pub mod vbar_el1;

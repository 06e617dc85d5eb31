// Book marketplace client for EVM smart contracts
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

//! Contract ABI bindings used by the client.
//!
//! Only the functions the storefront actually calls are declared. Read-status toggling uses
//! `markAsUnread` (lowercase `r`), matching the deployed `BookLibrary` contract.

#![allow(missing_docs)]

use alloy_sol_types::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IBookLibrary {
        function getBooksLength() external view returns (uint256);

        function getBook(uint256 index)
            external
            view
            returns (
                address owner,
                string title,
                string author,
                string image,
                uint256 price,
                uint256 sold,
                bool isRead
            );

        function addBook(string title, string author, string image, uint256 price) external;

        function buyBook(uint256 index) external;

        function removeBook(uint256 index) external;

        function markAsRead(uint256 index) external;

        function markAsUnread(uint256 index) external;
    }

    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);

        function balanceOf(address owner) external view returns (uint256 balance);
    }
}
